use guessboard_shared::{CanvasRecord, ClientKind, ClientMessage, EncodedImage, ServerMessage};
use tracing::{debug, info};
use uuid::Uuid;

use crate::state::{Relay, MAX_ACTION_LEN, MAX_DATA_URL_LEN};

#[cfg(test)]
#[path = "logic_test.rs"]
mod logic_test;

/// Peers that receive every pushed canvas.
pub const VIEWERS: &[ClientKind] = &[ClientKind::Display, ClientKind::Admin];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Audience {
    Sender,
    Viewers,
}

/// A client frame whose canvas payload has been validated and decoded, so
/// applying it under the relay lock is cheap.
#[derive(Debug)]
pub enum Prepared {
    Hello { client: ClientKind },
    Ping { timestamp: u64 },
    Update { record: CanvasRecord, data_url: String },
    Rejected(String),
}

/// Validation and image decoding for one client frame. Needs no relay state.
pub fn prepare(message: ClientMessage) -> Prepared {
    match message {
        ClientMessage::Hello { client, .. } => Prepared::Hello { client },
        ClientMessage::Ping { timestamp } => Prepared::Ping { timestamp },
        ClientMessage::CanvasUpdate {
            data_url,
            last_action,
            timestamp,
        } => {
            if data_url.len() > MAX_DATA_URL_LEN {
                return Prepared::Rejected("canvas image too large".to_string());
            }
            let image = match EncodedImage::from_data_url(&data_url) {
                Ok(image) => image,
                Err(error) => return Prepared::Rejected(error.to_string()),
            };
            Prepared::Update {
                record: CanvasRecord {
                    last_action: sanitize_action(last_action),
                    timestamp,
                    image,
                },
                data_url,
            }
        }
    }
}

pub fn apply_prepared(
    relay: &mut Relay,
    sender: Uuid,
    prepared: Prepared,
) -> Option<(Vec<ServerMessage>, Audience)> {
    match prepared {
        Prepared::Hello { client } => {
            let peer = relay.peers.get_mut(&sender)?;
            if peer.kind == ClientKind::Unknown {
                peer.kind = client;
            }
            let kind = peer.kind;
            info!(%sender, kind = ?kind, "client identified");
            let latest_canvas = if VIEWERS.contains(&kind) {
                relay.latest.as_ref().map(|record| record.image.to_data_url())
            } else {
                None
            };
            Some((
                vec![ServerMessage::Welcome {
                    client_id: sender.to_string(),
                    latest_canvas,
                }],
                Audience::Sender,
            ))
        }
        Prepared::Ping { timestamp } => {
            Some((vec![ServerMessage::Pong { timestamp }], Audience::Sender))
        }
        Prepared::Rejected(reason) => {
            debug!(%sender, %reason, "rejected canvas update");
            Some((vec![error_message(&reason)], Audience::Sender))
        }
        Prepared::Update { record, data_url } => {
            let kind = relay.peers.get(&sender)?.kind;
            if kind != ClientKind::Canvas {
                debug!(%sender, kind = ?kind, "canvas update from a non-drawing peer");
                return Some((
                    vec![error_message("only drawing clients may push the canvas")],
                    Audience::Sender,
                ));
            }
            debug!(
                %sender,
                action = %record.last_action,
                bytes = record.image.bytes.len(),
                "canvas update"
            );
            let broadcast = ServerMessage::BroadcastCanvas {
                data_url,
                last_action: record.last_action.clone(),
                timestamp: record.timestamp,
            };
            relay.latest = Some(record);
            relay.dirty = true;
            Some((vec![broadcast], Audience::Viewers))
        }
    }
}

fn error_message(message: &str) -> ServerMessage {
    ServerMessage::Error {
        message: message.to_string(),
    }
}

fn sanitize_action(mut action: String) -> String {
    if action.is_empty() {
        return "auto".to_string();
    }
    if action.len() > MAX_ACTION_LEN {
        let mut end = MAX_ACTION_LEN;
        while !action.is_char_boundary(end) {
            end -= 1;
        }
        action.truncate(end);
    }
    action
}

/// Queues `message` for every peer of the given kinds, dropping peers whose
/// socket task is gone. Returns how many peers received it.
pub fn deliver(relay: &mut Relay, kinds: &[ClientKind], message: &ServerMessage) -> usize {
    let mut stale = Vec::new();
    let mut delivered = 0;
    for (id, peer) in relay.peers.iter() {
        if !kinds.contains(&peer.kind) {
            continue;
        }
        if peer.tx.send(message.clone()).is_err() {
            stale.push(*id);
        } else {
            delivered += 1;
        }
    }
    for id in stale {
        relay.peers.remove(&id);
    }
    delivered
}

/// Routes the result of [`apply_prepared`].
pub fn dispatch(relay: &mut Relay, sender: Uuid, messages: Vec<ServerMessage>, audience: Audience) {
    for message in messages {
        match audience {
            Audience::Sender => {
                let closed = relay
                    .peers
                    .get(&sender)
                    .is_some_and(|peer| peer.tx.send(message).is_err());
                if closed {
                    relay.peers.remove(&sender);
                }
            }
            Audience::Viewers => {
                let delivered = deliver(relay, VIEWERS, &message);
                debug!(delivered, "broadcast to viewers");
            }
        }
    }
}
