use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::CanvasError;
use crate::fill::{FillOptions, DEFAULT_EXPAND_PX, DEFAULT_TOLERANCE};
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::tool::DEFAULT_BRUSH_WIDTH;

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

/// Tunables for a drawing session. Every field has a default, so a partial
/// JSON object is a valid override.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CanvasConfig {
    pub history_limit: usize,
    pub upload_debounce_ms: u64,
    pub heartbeat_interval_ms: u64,
    pub fill_tolerance: u8,
    pub fill_expand_px: u32,
    pub background: Rgba,
    pub brush_color: Rgba,
    pub brush_width: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            upload_debounce_ms: 400,
            heartbeat_interval_ms: 30_000,
            fill_tolerance: DEFAULT_TOLERANCE,
            fill_expand_px: DEFAULT_EXPAND_PX,
            background: Rgba::WHITE,
            brush_color: Rgba::BLACK,
            brush_width: DEFAULT_BRUSH_WIDTH,
        }
    }
}

impl CanvasConfig {
    pub fn from_json(text: &str) -> Result<Self, CanvasError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn fill_options(&self, color: Rgba) -> FillOptions {
        FillOptions {
            color,
            tolerance: self.fill_tolerance,
            expand_px: self.fill_expand_px,
        }
    }
}
