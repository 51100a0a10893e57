use super::*;

#[test]
fn secure_pages_use_wss() {
    assert_eq!(
        listener_url("https:", "game.example:8443"),
        "wss://game.example:8443/ws/listener"
    );
}

#[test]
fn plain_pages_use_ws() {
    assert_eq!(listener_url("http:", "localhost:8000"), "ws://localhost:8000/ws/listener");
}
