use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::CanvasError;
use crate::pixels::{EncodedImage, PixelBuffer};

/// Fully serialized scene as produced by the canvas backend.
///
/// The encoding belongs to the backend; the core only stores and replays it.
/// Backends must make it round-trip safe.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SceneState(String);

impl SceneState {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The vector-canvas library the session drives.
pub trait VectorCanvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Renders every object plus the background at native pixel size.
    fn rasterize(&mut self) -> Result<PixelBuffer, CanvasError>;

    fn serialize_scene(&self) -> Result<SceneState, CanvasError>;
    fn load_scene(&mut self, state: &SceneState) -> Result<(), CanvasError>;

    fn set_background_image(&mut self, image: &EncodedImage) -> Result<(), CanvasError>;
    fn clear_background_color(&mut self);

    fn object_count(&self) -> usize;
    fn remove_object(&mut self, index: usize);

    /// Drops every object and background image and paints `background`.
    fn clear(&mut self, background: Rgba);

    fn set_drawing_mode(&mut self, enabled: bool);
    fn set_brush_color(&mut self, color: Rgba);
    fn set_brush_width(&mut self, width: f32);

    fn render(&mut self) {}
}
