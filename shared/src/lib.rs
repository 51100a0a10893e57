use serde::{Deserialize, Serialize};

mod canvas_record;
mod color;
mod config;
mod error;
mod fill;
mod headless;
mod history;
mod pixels;
mod scene;
mod session;
mod tool;
mod upload;


pub use canvas_record::{
    decode_canvas_record, encode_canvas_record, CanvasRecord, RecordDecodeError,
    CANVAS_RECORD_MAGIC, CANVAS_RECORD_VERSION,
};
pub use color::Rgba;
pub use config::CanvasConfig;
pub use error::CanvasError;
pub use fill::{
    expand_fill, fill_pixels, flood_fill, FillOptions, FillOutcome, DEFAULT_EXPAND_PX,
    DEFAULT_TOLERANCE,
};
pub use headless::{HeadlessCanvas, SceneObject};
pub use history::{
    HistoryEntry, HistoryItem, HistoryPosition, HistoryTimeline, DEFAULT_HISTORY_LIMIT,
    INITIAL_LABEL,
};
pub use pixels::{EncodedImage, FillMask, ImageFormat, PixelBuffer};
pub use scene::{SceneState, VectorCanvas};
pub use session::{system_clock, CanvasSession, Clock, FillStart, FillTicket, PendingFill};
pub use tool::{sanitize_width, ToolMode, ToolState, DEFAULT_BRUSH_WIDTH};
pub use upload::{Mutation, MutationSink, UploadDebounce};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Nearest pixel coordinate, halves rounding up. Non-finite input maps to
    /// an out-of-range pixel.
    pub fn to_pixel(self) -> (i64, i64) {
        (round_coord(self.x), round_coord(self.y))
    }
}

fn round_coord(value: f32) -> i64 {
    if value.is_finite() {
        (value + 0.5).floor() as i64
    } else {
        -1
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    Canvas,
    Display,
    Admin,
    Unknown,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "hello")]
    Hello { client: ClientKind, timestamp: u64 },
    #[serde(rename = "ping")]
    Ping { timestamp: u64 },
    #[serde(rename = "canvas_update")]
    CanvasUpdate {
        data_url: String,
        last_action: String,
        timestamp: u64,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "welcome")]
    Welcome {
        client_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        latest_canvas: Option<String>,
    },
    #[serde(rename = "broadcast_canvas")]
    BroadcastCanvas {
        data_url: String,
        last_action: String,
        timestamp: u64,
    },
    #[serde(rename = "pong")]
    Pong { timestamp: u64 },
    #[serde(rename = "error")]
    Error { message: String },
}
