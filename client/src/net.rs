use wasm_bindgen::JsValue;
use web_sys::Window;

#[cfg(test)]
#[path = "net_test.rs"]
mod net_test;

pub const LISTENER_PATH: &str = "/ws/listener";

pub fn websocket_url(window: &Window) -> Result<String, JsValue> {
    let location = window.location();
    let protocol = location.protocol()?;
    let host = location.host()?;
    Ok(listener_url(&protocol, &host))
}

pub fn listener_url(protocol: &str, host: &str) -> String {
    let scheme = if protocol == "https:" { "wss" } else { "ws" };
    format!("{scheme}://{host}{LISTENER_PATH}")
}
