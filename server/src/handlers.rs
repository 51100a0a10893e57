use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::{SinkExt, StreamExt};
use guessboard_shared::{ClientKind, ClientMessage, ServerMessage};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::logic::{apply_prepared, dispatch, prepare, Audience};
use crate::persistence::archive_latest;
use crate::state::{AppState, Peer};

pub async fn ping_handler() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

pub async fn canvas_handler(State(state): State<AppState>) -> Response {
    let latest = state.relay.read().await.latest.clone();
    match latest {
        Some(record) => (
            [
                (header::CONTENT_TYPE, record.image.format.mime()),
                (header::CACHE_CONTROL, "no-store"),
            ],
            record.image.bytes,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn archive_handler(State(state): State<AppState>) -> Response {
    match archive_latest(&state, "manual").await {
        Ok(Some(path)) => Json(serde_json::json!({ "path": path.display().to_string() }))
            .into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(error) => {
            error!(%error, "archive failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut socket_sender, mut socket_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let connection_id = Uuid::new_v4();

    {
        let mut relay = state.relay.write().await;
        relay.peers.insert(
            connection_id,
            Peer {
                kind: ClientKind::Unknown,
                tx,
            },
        );
        info!(conn = %connection_id, peers = relay.peers.len(), "ws connected");
    }

    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            match serde_json::to_string(&message) {
                Ok(payload) => {
                    if socket_sender.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                Err(error) => warn!(%error, "server message serialize failed"),
            }
        }
    });

    let mut close_frame = None;

    while let Some(Ok(message)) = socket_receiver.next().await {
        match message {
            Message::Text(text) => {
                let parsed = serde_json::from_str::<ClientMessage>(&text).map(prepare);
                let mut relay = state.relay.write().await;
                match parsed {
                    Ok(prepared) => {
                        if let Some((messages, audience)) =
                            apply_prepared(&mut relay, connection_id, prepared)
                        {
                            dispatch(&mut relay, connection_id, messages, audience);
                        }
                    }
                    Err(error) => {
                        debug!(conn = %connection_id, %error, "malformed client frame");
                        let reply = ServerMessage::Error {
                            message: format!("malformed message: {error}"),
                        };
                        dispatch(&mut relay, connection_id, vec![reply], Audience::Sender);
                    }
                }
            }
            Message::Binary(data) => {
                debug!(conn = %connection_id, bytes = data.len(), "binary frame ignored");
            }
            Message::Close(frame) => {
                close_frame = frame;
                break;
            }
            _ => {}
        }
    }

    {
        let mut relay = state.relay.write().await;
        relay.peers.remove(&connection_id);
        info!(
            conn = %connection_id,
            peers = relay.peers.len(),
            viewers = relay.count(ClientKind::Display) + relay.count(ClientKind::Admin),
            "ws disconnected"
        );
    }
    if let Some(frame) = &close_frame {
        debug!(conn = %connection_id, code = frame.code, reason = %frame.reason, "ws close frame");
    }
    send_task.abort();
}
