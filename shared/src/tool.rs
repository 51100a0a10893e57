use serde::{Deserialize, Serialize};

use crate::color::Rgba;

#[cfg(test)]
#[path = "tool_test.rs"]
mod tool_test;

pub const DEFAULT_BRUSH_WIDTH: f32 = 6.0;
const MIN_BRUSH_WIDTH: f32 = 1.0;
const MAX_BRUSH_WIDTH: f32 = 60.0;

pub fn sanitize_width(width: f32) -> f32 {
    let width = if width.is_finite() {
        width
    } else {
        DEFAULT_BRUSH_WIDTH
    };
    width.max(MIN_BRUSH_WIDTH).min(MAX_BRUSH_WIDTH)
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    #[default]
    Brush,
    Eraser,
    Fill,
}

impl ToolMode {
    /// Whether pointer drags produce free-draw strokes.
    pub fn draws(self) -> bool {
        !matches!(self, ToolMode::Fill)
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolMode::Brush => "brush",
            ToolMode::Eraser => "eraser",
            ToolMode::Fill => "fill",
        }
    }
}

/// Active tool plus the brush settings it restores.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolState {
    mode: ToolMode,
    brush_color: Rgba,
    background: Rgba,
    brush_width: f32,
}

impl ToolState {
    pub fn new(brush_color: Rgba, background: Rgba, brush_width: f32) -> Self {
        Self {
            mode: ToolMode::Brush,
            brush_color,
            background,
            brush_width: sanitize_width(brush_width),
        }
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    /// The user's selected color, kept while erasing or filling.
    pub fn brush_color(&self) -> Rgba {
        self.brush_color
    }

    pub fn brush_width(&self) -> f32 {
        self.brush_width
    }

    pub fn background(&self) -> Rgba {
        self.background
    }

    /// Color the free-draw brush paints with. Erasing overpaints with the background.
    pub fn stroke_color(&self) -> Rgba {
        match self.mode {
            ToolMode::Eraser => self.background,
            ToolMode::Brush | ToolMode::Fill => self.brush_color,
        }
    }

    /// Selecting a color always returns to the brush.
    pub fn select_color(&mut self, color: Rgba) {
        self.brush_color = color;
        self.mode = ToolMode::Brush;
    }

    pub fn set_width(&mut self, width: f32) {
        self.brush_width = sanitize_width(width);
    }

    pub fn set_mode(&mut self, mode: ToolMode) {
        self.mode = mode;
    }

    /// Pressing the active tool's button again goes back to the brush.
    pub fn toggle(&mut self, mode: ToolMode) -> ToolMode {
        self.mode = if self.mode == mode {
            ToolMode::Brush
        } else {
            mode
        };
        self.mode
    }
}
