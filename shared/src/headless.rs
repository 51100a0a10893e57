//! In-memory canvas backend with a software rasterizer.
//!
//! Mirrors the subset of the browser vector canvas the session relies on:
//! free-draw paths, filled rectangles, a background color and a background
//! image. Used by tests and by any host without a browser canvas.

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::CanvasError;
use crate::pixels::{EncodedImage, PixelBuffer};
use crate::scene::{SceneState, VectorCanvas};
use crate::tool::DEFAULT_BRUSH_WIDTH;
use crate::Point;

#[cfg(test)]
#[path = "headless_test.rs"]
mod headless_test;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SceneObject {
    Path {
        color: Rgba,
        width: f32,
        points: Vec<Point>,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Rgba,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct HeadlessScene {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    background_color: Option<Rgba>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    background_image: Option<String>,
    objects: Vec<SceneObject>,
}

pub struct HeadlessCanvas {
    width: u32,
    height: u32,
    scene: HeadlessScene,
    background_pixels: Option<PixelBuffer>,
    drawing_mode: bool,
    brush_color: Rgba,
    brush_width: f32,
}

impl HeadlessCanvas {
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        Self {
            width,
            height,
            scene: HeadlessScene {
                background_color: Some(background),
                background_image: None,
                objects: Vec::new(),
            },
            background_pixels: None,
            drawing_mode: true,
            brush_color: Rgba::BLACK,
            brush_width: DEFAULT_BRUSH_WIDTH,
        }
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.scene.objects
    }

    pub fn add_object(&mut self, object: SceneObject) {
        self.scene.objects.push(object);
    }

    /// Adds a free-draw path using the current brush, as a completed stroke would.
    pub fn draw_path(&mut self, points: Vec<Point>) {
        let object = SceneObject::Path {
            color: self.brush_color,
            width: self.brush_width,
            points,
        };
        self.scene.objects.push(object);
    }

    pub fn background_color(&self) -> Option<Rgba> {
        self.scene.background_color
    }

    pub fn has_background_image(&self) -> bool {
        self.scene.background_image.is_some()
    }

    pub fn drawing_mode(&self) -> bool {
        self.drawing_mode
    }

    pub fn brush_color(&self) -> Rgba {
        self.brush_color
    }

    pub fn brush_width(&self) -> f32 {
        self.brush_width
    }

    fn paint_object(&self, buffer: &mut PixelBuffer, object: &SceneObject) {
        match object {
            SceneObject::Rect {
                x,
                y,
                width,
                height,
                fill,
            } => {
                let (x0, x1) = self.clamp_span(*x, *x + *width, self.width);
                let (y0, y1) = self.clamp_span(*y, *y + *height, self.height);
                for py in y0..y1 {
                    for px in x0..x1 {
                        buffer.blend(px, py, *fill);
                    }
                }
            }
            SceneObject::Path {
                color,
                width,
                points,
            } => {
                let radius = (width / 2.0).max(0.5);
                if let [only] = points.as_slice() {
                    stamp_disc(buffer, *only, radius, *color);
                }
                for pair in points.windows(2) {
                    stamp_segment(buffer, pair[0], pair[1], radius, *color);
                }
            }
        }
    }

    fn clamp_span(&self, start: f32, end: f32, limit: u32) -> (u32, u32) {
        let clamp = |value: f32| value.round().max(0.0).min(limit as f32) as u32;
        (clamp(start.min(end)), clamp(start.max(end)))
    }
}

fn stamp_segment(buffer: &mut PixelBuffer, from: Point, to: Point, radius: f32, color: Rgba) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length = (dx * dx + dy * dy).sqrt();
    let steps = (length * 2.0).ceil().max(1.0) as u32;
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let point = Point::new(from.x + dx * t, from.y + dy * t);
        stamp_disc(buffer, point, radius, color);
    }
}

/// Overwrites every pixel whose center lies within `radius` of `center`.
fn stamp_disc(buffer: &mut PixelBuffer, center: Point, radius: f32, color: Rgba) {
    let min_x = (center.x - radius).floor().max(0.0) as i64;
    let min_y = (center.y - radius).floor().max(0.0) as i64;
    let max_x = (center.x + radius).ceil() as i64;
    let max_y = (center.y + radius).ceil() as i64;
    for py in min_y..=max_y {
        for px in min_x..=max_x {
            if !buffer.contains(px, py) {
                continue;
            }
            let cx = px as f32 + 0.5 - center.x;
            let cy = py as f32 + 0.5 - center.y;
            if cx * cx + cy * cy <= radius * radius {
                buffer.put(px as u32, py as u32, color);
            }
        }
    }
}

impl VectorCanvas for HeadlessCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn rasterize(&mut self) -> Result<PixelBuffer, CanvasError> {
        let base = self.scene.background_color.unwrap_or(Rgba::TRANSPARENT);
        let mut buffer = PixelBuffer::new(self.width, self.height, base);
        if let Some(image) = &self.background_pixels {
            let w = image.width().min(self.width);
            let h = image.height().min(self.height);
            for y in 0..h {
                for x in 0..w {
                    buffer.blend(x, y, image.get(x, y));
                }
            }
        }
        for object in &self.scene.objects {
            self.paint_object(&mut buffer, object);
        }
        Ok(buffer)
    }

    fn serialize_scene(&self) -> Result<SceneState, CanvasError> {
        serde_json::to_string(&self.scene)
            .map(SceneState::new)
            .map_err(|error| CanvasError::Serialize(error.to_string()))
    }

    fn load_scene(&mut self, state: &SceneState) -> Result<(), CanvasError> {
        let scene: HeadlessScene = serde_json::from_str(state.as_str())
            .map_err(|error| CanvasError::Restore(error.to_string()))?;
        let background_pixels = match &scene.background_image {
            Some(url) => {
                let image = EncodedImage::from_data_url(url)?;
                Some(PixelBuffer::decode(&image)?)
            }
            None => None,
        };
        self.scene = scene;
        self.background_pixels = background_pixels;
        Ok(())
    }

    fn set_background_image(&mut self, image: &EncodedImage) -> Result<(), CanvasError> {
        let pixels = PixelBuffer::decode(image)?;
        self.scene.background_image = Some(image.to_data_url());
        self.background_pixels = Some(pixels);
        Ok(())
    }

    fn clear_background_color(&mut self) {
        self.scene.background_color = None;
    }

    fn object_count(&self) -> usize {
        self.scene.objects.len()
    }

    fn remove_object(&mut self, index: usize) {
        if index < self.scene.objects.len() {
            self.scene.objects.remove(index);
        }
    }

    fn clear(&mut self, background: Rgba) {
        self.scene = HeadlessScene {
            background_color: Some(background),
            background_image: None,
            objects: Vec::new(),
        };
        self.background_pixels = None;
    }

    fn set_drawing_mode(&mut self, enabled: bool) {
        self.drawing_mode = enabled;
    }

    fn set_brush_color(&mut self, color: Rgba) {
        self.brush_color = color;
    }

    fn set_brush_width(&mut self, width: f32) {
        self.brush_width = width;
    }
}
