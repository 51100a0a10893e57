use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket, Window};

use guessboard_shared::{ClientKind, ClientMessage, ServerMessage};

use crate::net::websocket_url;
use crate::util::{now_ms, random_reconnect_delay_ms};

#[derive(Debug)]
pub enum WsEvent {
    Open,
    Close,
    Error,
    Message(ServerMessage),
}

type EventHandler = Rc<RefCell<dyn FnMut(WsEvent)>>;

/// Self-reconnecting socket to the relay. Sends JSON text frames.
pub struct WsLink {
    window: Window,
    socket: RefCell<Option<WebSocket>>,
    heartbeat: Cell<Option<i32>>,
    heartbeat_ms: i32,
    on_event: EventHandler,
}

impl WsLink {
    pub fn connect(
        window: &Window,
        heartbeat_ms: u64,
        on_event: impl 'static + FnMut(WsEvent),
    ) -> Result<Rc<Self>, JsValue> {
        let link = Rc::new(Self {
            window: window.clone(),
            socket: RefCell::new(None),
            heartbeat: Cell::new(None),
            heartbeat_ms: i32::try_from(heartbeat_ms).unwrap_or(i32::MAX),
            on_event: Rc::new(RefCell::new(on_event)),
        });
        link.open()?;
        Ok(link)
    }

    pub fn is_open(&self) -> bool {
        self.socket
            .borrow()
            .as_ref()
            .is_some_and(|socket| socket.ready_state() == WebSocket::OPEN)
    }

    /// Returns whether the frame was handed to the socket.
    pub fn send(&self, message: &ClientMessage) -> bool {
        let socket = self.socket.borrow();
        let Some(socket) = socket.as_ref() else {
            return false;
        };
        if socket.ready_state() != WebSocket::OPEN {
            return false;
        }
        match serde_json::to_string(message) {
            Ok(payload) => socket.send_with_str(&payload).is_ok(),
            Err(error) => {
                log::error!("failed to encode client message: {error}");
                false
            }
        }
    }

    fn emit(&self, event: WsEvent) {
        match self.on_event.try_borrow_mut() {
            Ok(mut handler) => handler(event),
            Err(_) => log::warn!("socket event dropped during dispatch: {event:?}"),
        }
    }

    fn open(self: &Rc<Self>) -> Result<(), JsValue> {
        let url = websocket_url(&self.window)?;
        let socket = WebSocket::new(&url)?;
        log::info!("connecting to {url}");

        {
            let link = Rc::clone(self);
            let onopen = Closure::<dyn FnMut(Event)>::new(move |_| {
                link.send(&ClientMessage::Hello {
                    client: ClientKind::Canvas,
                    timestamp: now_ms(),
                });
                link.start_heartbeat();
                link.emit(WsEvent::Open);
            });
            socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));
            onopen.forget();
        }

        {
            let link = Rc::clone(self);
            let onclose = Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
                log::info!("socket closed (code {})", event.code());
                link.stop_heartbeat();
                link.emit(WsEvent::Close);
                link.schedule_reconnect();
            });
            socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));
            onclose.forget();
        }

        {
            let link = Rc::clone(self);
            let socket_cb = socket.clone();
            let onerror = Closure::<dyn FnMut(Event)>::new(move |_| {
                link.emit(WsEvent::Error);
                let _ = socket_cb.close();
            });
            socket.set_onerror(Some(onerror.as_ref().unchecked_ref()));
            onerror.forget();
        }

        {
            let link = Rc::clone(self);
            let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
                let Some(text) = event.data().as_string() else {
                    log::debug!("ignoring non-text frame");
                    return;
                };
                match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(message) => link.emit(WsEvent::Message(message)),
                    Err(error) => {
                        let snippet: String = text.chars().take(200).collect();
                        log::error!("server message parse error: {error} payload={snippet:?}");
                    }
                }
            });
            socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
            onmessage.forget();
        }

        *self.socket.borrow_mut() = Some(socket);
        Ok(())
    }

    fn start_heartbeat(self: &Rc<Self>) {
        self.stop_heartbeat();
        let link = Rc::clone(self);
        let ontick = Closure::<dyn FnMut()>::new(move || {
            link.send(&ClientMessage::Ping {
                timestamp: now_ms(),
            });
        });
        match self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                ontick.as_ref().unchecked_ref(),
                self.heartbeat_ms,
            ) {
            Ok(handle) => self.heartbeat.set(Some(handle)),
            Err(error) => log::warn!("heartbeat not started: {error:?}"),
        }
        ontick.forget();
    }

    fn stop_heartbeat(&self) {
        if let Some(handle) = self.heartbeat.take() {
            self.window.clear_interval_with_handle(handle);
        }
    }

    fn schedule_reconnect(self: &Rc<Self>) {
        let delay = random_reconnect_delay_ms();
        log::info!("reconnecting in {delay} ms");
        let link = Rc::clone(self);
        let onretry = Closure::once_into_js(move || {
            if let Err(error) = link.open() {
                log::error!("reconnect failed: {error:?}");
                link.schedule_reconnect();
            }
        });
        if let Err(error) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                onretry.unchecked_ref(),
                i32::try_from(delay).unwrap_or(i32::MAX),
            )
        {
            log::error!("reconnect timer not armed: {error:?}");
        }
    }
}
