use guessboard_shared::{EncodedImage, ImageFormat};
use tokio::sync::mpsc;

use super::*;
use crate::state::Peer;

fn join(
    relay: &mut Relay,
    kind: ClientKind,
) -> (Uuid, mpsc::UnboundedReceiver<ServerMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let id = Uuid::new_v4();
    relay.peers.insert(id, Peer { kind, tx });
    (id, rx)
}

fn apply(
    relay: &mut Relay,
    sender: Uuid,
    message: ClientMessage,
) -> Option<(Vec<ServerMessage>, Audience)> {
    apply_prepared(relay, sender, prepare(message))
}

fn jpeg_url() -> String {
    EncodedImage {
        format: ImageFormat::Jpeg,
        bytes: vec![0xff, 0xd8, 0xff, 0xd9],
    }
    .to_data_url()
}

fn update(action: &str) -> ClientMessage {
    ClientMessage::CanvasUpdate {
        data_url: jpeg_url(),
        last_action: action.to_string(),
        timestamp: 42,
    }
}

#[test]
fn hello_identifies_unknown_peer_once() {
    let mut relay = Relay::default();
    let (id, _rx) = join(&mut relay, ClientKind::Unknown);
    let hello = |client| ClientMessage::Hello {
        client,
        timestamp: 1,
    };

    let (replies, audience) =
        apply(&mut relay, id, hello(ClientKind::Canvas)).unwrap();
    assert_eq!(audience, Audience::Sender);
    assert_eq!(
        replies,
        vec![ServerMessage::Welcome {
            client_id: id.to_string(),
            latest_canvas: None,
        }]
    );
    apply(&mut relay, id, hello(ClientKind::Admin));
    assert_eq!(relay.peers[&id].kind, ClientKind::Canvas);
}

#[test]
fn hello_from_vanished_peer_is_ignored() {
    let mut relay = Relay::default();
    let message = ClientMessage::Hello {
        client: ClientKind::Display,
        timestamp: 1,
    };
    assert!(apply(&mut relay, Uuid::new_v4(), message).is_none());
}

#[test]
fn viewers_are_welcomed_with_latest_canvas() {
    let mut relay = Relay::default();
    let (canvas, _canvas_rx) = join(&mut relay, ClientKind::Canvas);
    apply(&mut relay, canvas, update("fill"));

    let (display, _display_rx) = join(&mut relay, ClientKind::Unknown);
    let hello = ClientMessage::Hello {
        client: ClientKind::Display,
        timestamp: 2,
    };
    let (replies, _) = apply(&mut relay, display, hello).unwrap();
    assert_eq!(
        replies,
        vec![ServerMessage::Welcome {
            client_id: display.to_string(),
            latest_canvas: Some(jpeg_url()),
        }]
    );
}

#[test]
fn canvas_update_is_stored_and_relayed_to_viewers() {
    let mut relay = Relay::default();
    let (canvas, _canvas_rx) = join(&mut relay, ClientKind::Canvas);
    let (_display, mut display_rx) = join(&mut relay, ClientKind::Display);
    let (_admin, mut admin_rx) = join(&mut relay, ClientKind::Admin);

    let (messages, audience) = apply(&mut relay, canvas, update("undo")).unwrap();
    assert_eq!(audience, Audience::Viewers);
    assert!(relay.dirty);
    let latest = relay.latest.as_ref().unwrap();
    assert_eq!(latest.last_action, "undo");
    assert_eq!(latest.timestamp, 42);
    assert_eq!(latest.image.format, ImageFormat::Jpeg);

    for message in &messages {
        assert_eq!(deliver(&mut relay, VIEWERS, message), 2);
    }
    let expected = ServerMessage::BroadcastCanvas {
        data_url: jpeg_url(),
        last_action: "undo".to_string(),
        timestamp: 42,
    };
    assert_eq!(display_rx.try_recv().unwrap(), expected);
    assert_eq!(admin_rx.try_recv().unwrap(), expected);
}

#[test]
fn malformed_data_url_is_answered_with_error() {
    let mut relay = Relay::default();
    let (canvas, _rx) = join(&mut relay, ClientKind::Canvas);
    let message = ClientMessage::CanvasUpdate {
        data_url: "not a data url".to_string(),
        last_action: "draw".to_string(),
        timestamp: 1,
    };
    let (replies, audience) = apply(&mut relay, canvas, message).unwrap();
    assert_eq!(audience, Audience::Sender);
    assert!(matches!(replies.as_slice(), [ServerMessage::Error { .. }]));
    assert!(relay.latest.is_none());
    assert!(!relay.dirty);
}

#[test]
fn empty_and_oversized_actions_are_normalized() {
    let mut relay = Relay::default();
    let (canvas, _rx) = join(&mut relay, ClientKind::Canvas);
    apply(&mut relay, canvas, update(""));
    assert_eq!(relay.latest.as_ref().unwrap().last_action, "auto");
    apply(&mut relay, canvas, update(&"x".repeat(200)));
    assert_eq!(relay.latest.as_ref().unwrap().last_action.len(), MAX_ACTION_LEN);
}

#[test]
fn ping_is_answered_with_pong() {
    let mut relay = Relay::default();
    let (id, _rx) = join(&mut relay, ClientKind::Canvas);
    let (replies, audience) =
        apply(&mut relay, id, ClientMessage::Ping { timestamp: 9 }).unwrap();
    assert_eq!(audience, Audience::Sender);
    assert_eq!(replies, vec![ServerMessage::Pong { timestamp: 9 }]);
}

#[test]
fn deliver_drops_closed_peers() {
    let mut relay = Relay::default();
    let (gone, rx) = join(&mut relay, ClientKind::Display);
    drop(rx);
    let (_canvas, mut canvas_rx) = join(&mut relay, ClientKind::Canvas);
    let message = ServerMessage::Pong { timestamp: 1 };
    assert_eq!(deliver(&mut relay, VIEWERS, &message), 0);
    assert!(!relay.peers.contains_key(&gone));
    assert_eq!(relay.count(ClientKind::Canvas), 1);
    assert!(canvas_rx.try_recv().is_err());
}

#[test]
fn dispatch_replies_only_to_sender() {
    let mut relay = Relay::default();
    let (canvas, mut canvas_rx) = join(&mut relay, ClientKind::Canvas);
    let (_display, mut display_rx) = join(&mut relay, ClientKind::Display);
    let pong = ServerMessage::Pong { timestamp: 3 };
    dispatch(&mut relay, canvas, vec![pong.clone()], Audience::Sender);
    assert_eq!(canvas_rx.try_recv().unwrap(), pong);
    assert!(display_rx.try_recv().is_err());
}

#[test]
fn dispatch_skips_drawing_clients_on_broadcast() {
    let mut relay = Relay::default();
    let (canvas, mut canvas_rx) = join(&mut relay, ClientKind::Canvas);
    let (_display, mut display_rx) = join(&mut relay, ClientKind::Display);
    let (_unknown, mut unknown_rx) = join(&mut relay, ClientKind::Unknown);
    let (messages, audience) = apply(&mut relay, canvas, update("reset")).unwrap();
    dispatch(&mut relay, canvas, messages, audience);
    assert!(matches!(
        display_rx.try_recv(),
        Ok(ServerMessage::BroadcastCanvas { .. })
    ));
    assert!(canvas_rx.try_recv().is_err());
    assert!(unknown_rx.try_recv().is_err());
}

#[test]
fn canvas_update_from_viewer_is_refused() {
    let mut relay = Relay::default();
    let (display, _display_rx) = join(&mut relay, ClientKind::Display);
    let (unknown, _unknown_rx) = join(&mut relay, ClientKind::Unknown);
    let (_admin, mut admin_rx) = join(&mut relay, ClientKind::Admin);

    for sender in [display, unknown] {
        let (replies, audience) = apply(&mut relay, sender, update("draw")).unwrap();
        assert_eq!(audience, Audience::Sender);
        assert!(matches!(replies.as_slice(), [ServerMessage::Error { .. }]));
    }
    assert!(relay.latest.is_none());
    assert!(!relay.dirty);
    assert!(admin_rx.try_recv().is_err());
}

#[test]
fn canvas_update_from_vanished_peer_is_dropped() {
    let mut relay = Relay::default();
    assert!(apply(&mut relay, Uuid::new_v4(), update("draw")).is_none());
    assert!(relay.latest.is_none());
}

#[test]
fn prepare_decodes_update_without_relay() {
    match prepare(update("fill")) {
        Prepared::Update { record, data_url } => {
            assert_eq!(record.last_action, "fill");
            assert_eq!(record.image.format, ImageFormat::Jpeg);
            assert_eq!(data_url, jpeg_url());
        }
        other => panic!("unexpected {other:?}"),
    }
    let oversized = ClientMessage::CanvasUpdate {
        data_url: "x".repeat(MAX_DATA_URL_LEN + 1),
        last_action: "draw".to_string(),
        timestamp: 1,
    };
    assert!(matches!(prepare(oversized), Prepared::Rejected(_)));
}
