use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlAnchorElement, HtmlImageElement};

use guessboard_shared::{
    CanvasError, CanvasSession, ClientMessage, FillStart, ImageFormat, PendingFill, Point,
};

use crate::fabric::WebCanvas;
use crate::sink::BrowserSink;
use crate::util::{download_file_name_now, now_ms};
use crate::ws::WsLink;

pub type Session = CanvasSession<WebCanvas, BrowserSink>;
pub type SharedSession = Rc<RefCell<Session>>;

/// Paint-bucket click. The filled image is decoded by the browser and
/// committed from its `load` handler.
pub fn start_fill(session: &SharedSession, point: Point) {
    let start = match session.try_borrow_mut() {
        Ok(mut session) => session.on_fill_click(point),
        Err(_) => {
            log::warn!("fill click ignored while the canvas is busy");
            return;
        }
    };
    match start {
        Ok(FillStart::Ready(pending)) => decode_and_commit(session, pending),
        Ok(FillStart::Busy) => log::info!("fill ignored, the previous fill is still decoding"),
        Ok(FillStart::OutOfRange | FillStart::SameColor) => {}
        Err(error) => log::error!("fill failed: {error}"),
    }
}

fn decode_and_commit(session: &SharedSession, pending: PendingFill) {
    let ticket = pending.ticket;
    let image = match HtmlImageElement::new() {
        Ok(image) => image,
        Err(error) => {
            let error = CanvasError::Decode(format!("{error:?}"));
            session.borrow_mut().abandon_fill(ticket, &error);
            return;
        }
    };
    let url = pending.image.to_data_url();

    let onload = {
        let session = session.clone();
        let image = image.clone();
        let url = url.clone();
        Closure::once_into_js(move || {
            let mut session = session.borrow_mut();
            if session.fill_in_flight() != Some(ticket) {
                log::debug!("decoded fill image arrived after {ticket:?} was cancelled");
                return;
            }
            if let Err(error) = session.canvas_mut().stage_background(url, &image) {
                let error = CanvasError::Decode(format!("{error:?}"));
                session.abandon_fill(ticket, &error);
                return;
            }
            session.commit_fill(&pending);
        })
    };
    let onerror = {
        let session = session.clone();
        Closure::once_into_js(move || {
            let error = CanvasError::Decode("browser could not load the filled image".into());
            session.borrow_mut().abandon_fill(ticket, &error);
        })
    };
    image.set_onload(Some(onload.unchecked_ref()));
    image.set_onerror(Some(onerror.unchecked_ref()));
    image.set_src(&url);
}

/// Sends the debounced upload if its quiet period is over. Uploads that
/// find the socket closed are dropped.
pub fn flush_upload(session: &SharedSession, link: &WsLink) {
    let Ok(mut session) = session.try_borrow_mut() else {
        log::warn!("upload timer fired while the canvas was busy");
        return;
    };
    let Some(action) = session.sink_mut().take_due() else {
        return;
    };
    if !link.is_open() {
        log::warn!("upload for {action} dropped, socket not open");
        return;
    }
    let image = match session.export_image(ImageFormat::Jpeg) {
        Ok(image) => image,
        Err(error) => {
            log::error!("upload for {action} not encoded: {error}");
            return;
        }
    };
    drop(session);
    let sent = link.send(&ClientMessage::CanvasUpdate {
        data_url: image.to_data_url(),
        last_action: action.clone(),
        timestamp: now_ms(),
    });
    if sent {
        log::debug!("uploaded canvas after {action}");
    } else {
        log::warn!("upload for {action} was not sent");
    }
}

/// Saves the current canvas as a timestamped PNG.
pub fn download_png(document: &Document, session: &SharedSession) -> Result<(), JsValue> {
    let image = session
        .borrow_mut()
        .export_image(ImageFormat::Png)
        .map_err(|error| JsValue::from_str(&error.to_string()))?;
    let anchor = document
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| JsValue::from_str("anchor element expected"))?;
    anchor.set_href(&image.to_data_url());
    anchor.set_download(&download_file_name_now());
    anchor.click();
    Ok(())
}
