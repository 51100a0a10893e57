use thiserror::Error;

/// Failures surfaced by the canvas core and its backends.
///
/// None of these reach the user as a blocking dialog; callers log them and
/// treat the triggering mutation as not having happened.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("invalid color {0:?}")]
    InvalidColor(String),
    #[error("pixel data has {actual} bytes, expected {expected} for {width}x{height}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("scene serialization failed: {0}")]
    Serialize(String),
    #[error("scene restore failed: {0}")]
    Restore(String),
    #[error("image encode failed: {0}")]
    Encode(String),
    #[error("image decode failed: {0}")]
    Decode(String),
    #[error("malformed data url")]
    DataUrl,
    #[error("canvas backend failed: {0}")]
    Backend(String),
    #[error("another fill is still being committed")]
    FillInFlight,
    #[error("invalid canvas config: {0}")]
    Config(#[from] serde_json::Error),
}
