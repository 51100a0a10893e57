use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlButtonElement, HtmlElement, HtmlInputElement, KeyboardEvent,
    Window,
};

use guessboard_shared::{CanvasConfig, CanvasSession, Rgba, ServerMessage, ToolMode};

use crate::actions::{download_png, flush_upload, start_fill, Session, SharedSession};
use crate::dom::{
    get_element, history_index_from_event, select_swatch, set_color_input, set_status,
    set_tool_buttons, update_size_preview,
};
use crate::fabric::WebCanvas;
use crate::sink::{BrowserSink, HistoryPanel};
use crate::util::now_ms;
use crate::ws::{WsEvent, WsLink};

const CANVAS_ID: &str = "main-canvas";
const CONFIG_ID: &str = "canvas-config";
const SIDEBAR_WIDTH: f64 = 300.0;
const TOOLBAR_HEIGHT: f64 = 60.0;

#[derive(Clone)]
struct ToolUi {
    document: Document,
    eraser: HtmlButtonElement,
    fill: HtmlButtonElement,
    color_input: HtmlInputElement,
    size_input: HtmlInputElement,
    size_dot: HtmlElement,
}

impl ToolUi {
    fn sync(&self, session: &Session) {
        let tools = session.tools();
        set_tool_buttons(&self.eraser, &self.fill, tools.mode());
        if let Err(error) = select_swatch(&self.document, tools.brush_color()) {
            log::warn!("swatches not updated: {error:?}");
        }
        set_color_input(&self.color_input, tools.brush_color());
        update_size_preview(&self.size_input, &self.size_dot, tools.brush_width());
    }
}

fn canvas_size(window: &Window) -> (f64, f64) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(800.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(600.0);
    (
        (width - SIDEBAR_WIDTH).max(1.0),
        (height - TOOLBAR_HEIGHT).max(1.0),
    )
}

fn read_config(document: &Document) -> CanvasConfig {
    let Some(text) = document
        .get_element_by_id(CONFIG_ID)
        .and_then(|element| element.text_content())
    else {
        return CanvasConfig::default();
    };
    match CanvasConfig::from_json(&text) {
        Ok(config) => config,
        Err(error) => {
            log::warn!("{error}, using defaults");
            CanvasConfig::default()
        }
    }
}

fn on_click(
    button: &HtmlButtonElement,
    handler: impl 'static + FnMut(Event),
) -> Result<(), JsValue> {
    let onclick = Closure::<dyn FnMut(Event)>::new(handler);
    button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
    onclick.forget();
    Ok(())
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let started = Rc::new(Cell::new(false));

    if document.ready_state() == "complete" {
        started.set(true);
        return start_app(&window, &document);
    }

    let onload_started = started.clone();
    let onload_window = window.clone();
    let onload = Closure::<dyn FnMut(Event)>::new(move |_| {
        if onload_started.replace(true) {
            return;
        }
        if let Err(err) = start_app(&onload_window, &document) {
            log::error!("canvas failed to start: {err:?}");
        }
    });
    window.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
    onload.forget();

    Ok(())
}

fn start_app(window: &Window, document: &Document) -> Result<(), JsValue> {
    let config = read_config(document);

    let undo_button: HtmlButtonElement = get_element(document, "undo-btn")?;
    let redo_button: HtmlButtonElement = get_element(document, "redo-btn")?;
    let reset_button: HtmlButtonElement = get_element(document, "reset-btn")?;
    let download_button: HtmlButtonElement = get_element(document, "download-btn")?;
    let history_list: Element = get_element(document, "history-list")?;
    let status: Option<Element> = document.get_element_by_id("connection-status");
    let tool_ui = ToolUi {
        document: document.clone(),
        eraser: get_element(document, "eraser-btn")?,
        fill: get_element(document, "fill-btn")?,
        color_input: get_element(document, "brush-color")?,
        size_input: get_element(document, "brush-size")?,
        size_dot: get_element(document, "brush-preview-dot")?,
    };

    let (width, height) = canvas_size(window);
    let canvas = WebCanvas::new(CANVAS_ID, width, height, config.background)?;
    let sink = BrowserSink::new(
        window.clone(),
        config.upload_debounce_ms,
        HistoryPanel {
            document: document.clone(),
            list: history_list.clone(),
            undo: undo_button.clone(),
            redo: redo_button.clone(),
        },
    );
    let heartbeat_ms = config.heartbeat_interval_ms;
    let session = CanvasSession::new(canvas, sink, config, now_ms)
        .map_err(|error| JsValue::from_str(&error.to_string()))?;
    tool_ui.sync(&session);
    let session: SharedSession = Rc::new(RefCell::new(session));

    let link = {
        let status = status.clone();
        WsLink::connect(window, heartbeat_ms, move |event| match event {
            WsEvent::Open => set_status(status.as_ref(), "connected", "Connected"),
            WsEvent::Close => set_status(status.as_ref(), "reconnecting", "Reconnecting"),
            WsEvent::Error => log::warn!("socket error"),
            WsEvent::Message(ServerMessage::Welcome { client_id, .. }) => {
                log::info!("registered with the relay as {client_id}");
            }
            WsEvent::Message(ServerMessage::Pong { timestamp }) => {
                log::debug!("pong after {} ms", now_ms().saturating_sub(timestamp));
            }
            WsEvent::Message(ServerMessage::Error { message }) => {
                log::warn!("relay rejected a message: {message}");
            }
            WsEvent::Message(ServerMessage::BroadcastCanvas { .. }) => {}
        })?
    };

    {
        let session_cb = session.clone();
        let link = link.clone();
        let onupload = Closure::<dyn FnMut()>::new(move || flush_upload(&session_cb, &link));
        session
            .borrow_mut()
            .sink_mut()
            .set_upload_callback(onupload.into_js_value().unchecked_into());
    }

    {
        let session_cb = session.clone();
        let onpath = Closure::<dyn FnMut(JsValue)>::new(move |_| {
            match session_cb.try_borrow_mut() {
                Ok(mut session) => {
                    session.on_path_created();
                }
                Err(_) => log::warn!("stroke finished while the canvas was busy"),
            }
        });
        session.borrow().canvas().on("path:created", onpath);
    }

    {
        let session_cb = session.clone();
        let onmodified = Closure::<dyn FnMut(JsValue)>::new(move |_| {
            match session_cb.try_borrow_mut() {
                Ok(mut session) => {
                    session.on_object_modified();
                }
                Err(_) => log::warn!("object edit finished while the canvas was busy"),
            }
        });
        session.borrow().canvas().on("object:modified", onmodified);
    }

    {
        let session_cb = session.clone();
        let onmousedown = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            let point = {
                let Ok(session) = session_cb.try_borrow() else {
                    return;
                };
                if session.tools().mode() != ToolMode::Fill {
                    return;
                }
                session.canvas().pointer(&event)
            };
            match point {
                Some(point) => start_fill(&session_cb, point),
                None => log::warn!("fill click without pointer coordinates"),
            }
        });
        session.borrow().canvas().on("mouse:down", onmousedown);
    }

    {
        let session = session.clone();
        on_click(&undo_button, move |_| {
            session.borrow_mut().undo();
        })?;
    }

    {
        let session = session.clone();
        on_click(&redo_button, move |_| {
            session.borrow_mut().redo();
        })?;
    }

    {
        let session = session.clone();
        let tool_ui = tool_ui.clone();
        on_click(&reset_button, move |_| {
            let mut session = session.borrow_mut();
            session.reset_history();
            tool_ui.sync(&session);
        })?;
    }

    {
        let session = session.clone();
        let tool_ui_cb = tool_ui.clone();
        on_click(&tool_ui.eraser, move |_| {
            let mut session = session.borrow_mut();
            session.toggle_eraser();
            tool_ui_cb.sync(&session);
        })?;
    }

    {
        let session = session.clone();
        let tool_ui_cb = tool_ui.clone();
        on_click(&tool_ui.fill, move |_| {
            let mut session = session.borrow_mut();
            session.toggle_fill();
            tool_ui_cb.sync(&session);
        })?;
    }

    {
        let session = session.clone();
        let document = document.clone();
        on_click(&download_button, move |_| {
            if let Err(error) = download_png(&document, &session) {
                log::error!("download failed: {error:?}");
            }
        })?;
    }

    {
        let swatches = document.query_selector_all(".color-swatch[data-color]")?;
        for index in 0..swatches.length() {
            let Some(swatch) = swatches
                .item(index)
                .and_then(|node| node.dyn_into::<Element>().ok())
            else {
                continue;
            };
            let color = match swatch
                .get_attribute("data-color")
                .map(|value| Rgba::from_hex(&value))
            {
                Some(Ok(color)) => color,
                Some(Err(error)) => {
                    log::warn!("swatch skipped: {error}");
                    continue;
                }
                None => continue,
            };
            let session = session.clone();
            let tool_ui = tool_ui.clone();
            let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
                let mut session = session.borrow_mut();
                session.set_brush_color(color);
                tool_ui.sync(&session);
            });
            swatch.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
            onclick.forget();
        }
    }

    {
        let session = session.clone();
        let tool_ui_cb = tool_ui.clone();
        let oninput = Closure::<dyn FnMut(Event)>::new(move |_| {
            match Rgba::from_hex(&tool_ui_cb.color_input.value()) {
                Ok(color) => {
                    let mut session = session.borrow_mut();
                    session.set_brush_color(color);
                    tool_ui_cb.sync(&session);
                }
                Err(error) => log::warn!("color input ignored: {error}"),
            }
        });
        tool_ui
            .color_input
            .add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();
    }

    {
        let session = session.clone();
        let tool_ui_cb = tool_ui.clone();
        let oninput = Closure::<dyn FnMut(Event)>::new(move |_| {
            let Ok(width) = tool_ui_cb.size_input.value().parse::<f32>() else {
                return;
            };
            let mut session = session.borrow_mut();
            session.set_brush_width(width);
            tool_ui_cb.sync(&session);
        });
        tool_ui
            .size_input
            .add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();
    }

    {
        let session = session.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if let Some(index) = history_index_from_event(&event) {
                session.borrow_mut().jump_history(index);
            }
        });
        history_list.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let session = session.clone();
        let window_cb = window.clone();
        let onresize = Closure::<dyn FnMut(Event)>::new(move |_| {
            let (width, height) = canvas_size(&window_cb);
            let mut session = session.borrow_mut();
            session.canvas_mut().resize(width, height);
        });
        window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref())?;
        onresize.forget();
    }

    {
        let session = session.clone();
        let onkeydown = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            let key = event.key();
            if !(event.meta_key() || event.ctrl_key()) {
                return;
            }
            if event.shift_key() && key.eq_ignore_ascii_case("z") {
                event.prevent_default();
                session.borrow_mut().redo();
                return;
            }
            if key.eq_ignore_ascii_case("z") {
                event.prevent_default();
                session.borrow_mut().undo();
                return;
            }
            if key.eq_ignore_ascii_case("y") {
                event.prevent_default();
                session.borrow_mut().redo();
            }
        });
        window.add_event_listener_with_callback("keydown", onkeydown.as_ref().unchecked_ref())?;
        onkeydown.forget();
    }

    log::info!("canvas ready ({width}x{height})");
    Ok(())
}
