use std::path::PathBuf;
use std::time::Duration;

use guessboard_shared::CanvasRecord;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::state::AppState;
use crate::storage::{Storage, StorageError};

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

pub async fn restore_latest(storage: &dyn Storage) -> Option<CanvasRecord> {
    match storage.load_latest().await {
        Ok(Some(record)) => {
            info!(action = %record.last_action, timestamp = record.timestamp, "restored latest canvas");
            Some(record)
        }
        Ok(None) => None,
        Err(error) => {
            warn!(%error, "could not restore latest canvas; starting empty");
            None
        }
    }
}

/// Persists the latest canvas when it changed since the last save.
/// A failed save leaves the relay dirty so the next tick retries.
pub async fn save_if_dirty(state: &AppState) -> bool {
    let record = {
        let mut relay = state.relay.write().await;
        if !relay.dirty {
            return false;
        }
        relay.dirty = false;
        relay.latest.clone()
    };
    let Some(record) = record else {
        return false;
    };
    match state.storage.save_latest(&record).await {
        Ok(()) => true,
        Err(error) => {
            warn!(%error, "saving latest canvas failed");
            state.relay.write().await.dirty = true;
            false
        }
    }
}

pub fn spawn_autosave(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            save_if_dirty(&state).await;
        }
    })
}

/// `Ok(None)` when no canvas has been pushed yet.
pub async fn archive_latest(
    state: &AppState,
    reason: &str,
) -> Result<Option<PathBuf>, StorageError> {
    let record = state.relay.read().await.latest.clone();
    let Some(record) = record else {
        return Ok(None);
    };
    let path = state.storage.archive(&record, reason).await?;
    info!(path = %path.display(), "archived canvas");
    Ok(Some(path))
}
