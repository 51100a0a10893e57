use std::path::PathBuf;

use async_trait::async_trait;
use guessboard_shared::{
    decode_canvas_record, encode_canvas_record, CanvasRecord, RecordDecodeError,
};
use thiserror::Error;

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

const LATEST_FILE: &str = "latest.bin";
const ARCHIVE_DIR: &str = "history";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Record(#[from] RecordDecodeError),
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// `Ok(None)` when nothing was saved yet.
    async fn load_latest(&self) -> Result<Option<CanvasRecord>, StorageError>;
    async fn save_latest(&self, record: &CanvasRecord) -> Result<(), StorageError>;
    /// Writes the record's image as a standalone file and returns its path.
    async fn archive(&self, record: &CanvasRecord, reason: &str) -> Result<PathBuf, StorageError>;
}

pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn archive_dir(&self) -> PathBuf {
        self.data_dir.join(ARCHIVE_DIR)
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn load_latest(&self) -> Result<Option<CanvasRecord>, StorageError> {
        let path = self.data_dir.join(LATEST_FILE);
        let payload = match tokio::fs::read(path).await {
            Ok(payload) => payload,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        Ok(Some(decode_canvas_record(&payload)?))
    }

    async fn save_latest(&self, record: &CanvasRecord) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let path = self.data_dir.join(LATEST_FILE);
        let staging = self.data_dir.join(format!("{LATEST_FILE}.tmp"));
        tokio::fs::write(&staging, encode_canvas_record(record)).await?;
        tokio::fs::rename(staging, path).await?;
        Ok(())
    }

    async fn archive(&self, record: &CanvasRecord, reason: &str) -> Result<PathBuf, StorageError> {
        let dir = self.archive_dir();
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(archive_file_name(record, reason));
        tokio::fs::write(&path, &record.image.bytes).await?;
        Ok(path)
    }
}

/// `{timestamp}_{action}_{reason}.{ext}`, restricted to filename-safe characters.
pub fn archive_file_name(record: &CanvasRecord, reason: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        record.timestamp,
        file_safe(&record.last_action),
        file_safe(reason),
        record.image.format.extension()
    )
}

fn file_safe(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}
