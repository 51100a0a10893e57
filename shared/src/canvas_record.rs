use bincode::{Decode, Encode};
use thiserror::Error;

use crate::pixels::EncodedImage;

#[cfg(test)]
#[path = "canvas_record_test.rs"]
mod canvas_record_test;

pub const CANVAS_RECORD_MAGIC: [u8; 4] = *b"GBCV";
pub const CANVAS_RECORD_VERSION: u32 = 1;
const CANVAS_RECORD_HEADER_LEN: usize = CANVAS_RECORD_MAGIC.len() + std::mem::size_of::<u32>();

/// Latest canvas pushed by a drawing client, as the relay keeps it on disk.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, serde::Serialize, serde::Deserialize)]
pub struct CanvasRecord {
    pub last_action: String,
    pub timestamp: u64,
    pub image: EncodedImage,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordDecodeError {
    #[error("unsupported canvas record version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid canvas record")]
    InvalidData,
}

pub fn encode_canvas_record(record: &CanvasRecord) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&CANVAS_RECORD_MAGIC);
    payload.extend_from_slice(&CANVAS_RECORD_VERSION.to_le_bytes());
    let body = bincode::encode_to_vec(record, bincode::config::standard()).unwrap_or_default();
    payload.extend_from_slice(&body);
    payload
}

pub fn decode_canvas_record(payload: &[u8]) -> Result<CanvasRecord, RecordDecodeError> {
    if !(payload.len() >= CANVAS_RECORD_HEADER_LEN && payload.starts_with(&CANVAS_RECORD_MAGIC)) {
        return Err(RecordDecodeError::InvalidData);
    }
    let version = u32::from_le_bytes(
        payload[CANVAS_RECORD_MAGIC.len()..CANVAS_RECORD_HEADER_LEN]
            .try_into()
            .map_err(|_| RecordDecodeError::InvalidData)?,
    );
    let body = &payload[CANVAS_RECORD_HEADER_LEN..];
    match version {
        1 => bincode::decode_from_slice(body, bincode::config::standard())
            .map(|(record, _)| record)
            .map_err(|_| RecordDecodeError::InvalidData),
        _ => Err(RecordDecodeError::UnsupportedVersion(version)),
    }
}
