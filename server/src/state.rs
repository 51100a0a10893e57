use std::collections::HashMap;
use std::sync::Arc;

use guessboard_shared::{CanvasRecord, ClientKind, ServerMessage};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::storage::Storage;

/// Upper bound on an uploaded data URL, in bytes.
pub const MAX_DATA_URL_LEN: usize = 16 * 1024 * 1024;
pub const MAX_ACTION_LEN: usize = 64;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RwLock<Relay>>,
    pub storage: Arc<dyn Storage>,
}

pub struct Peer {
    pub kind: ClientKind,
    pub tx: mpsc::UnboundedSender<ServerMessage>,
}

/// Connected peers plus the newest canvas any drawing client pushed.
#[derive(Default)]
pub struct Relay {
    pub peers: HashMap<Uuid, Peer>,
    pub latest: Option<CanvasRecord>,
    pub dirty: bool,
}

impl Relay {
    pub fn new(latest: Option<CanvasRecord>) -> Self {
        Self {
            peers: HashMap::new(),
            latest,
            dirty: false,
        }
    }

    pub fn count(&self, kind: ClientKind) -> usize {
        self.peers.values().filter(|peer| peer.kind == kind).count()
    }
}
