//! Paint-bucket rasterization: tolerance flood fill plus seam-closing dilation.

use log::debug;

use crate::color::Rgba;
use crate::pixels::{FillMask, PixelBuffer};

#[cfg(test)]
#[path = "fill_test.rs"]
mod fill_test;

pub const DEFAULT_TOLERANCE: u8 = 5;
pub const DEFAULT_EXPAND_PX: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillOptions {
    pub color: Rgba,
    pub tolerance: u8,
    pub expand_px: u32,
}

impl FillOptions {
    pub fn new(color: Rgba) -> Self {
        Self {
            color,
            tolerance: DEFAULT_TOLERANCE,
            expand_px: DEFAULT_EXPAND_PX,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillOutcome {
    /// The seed lies outside the raster.
    OutOfRange,
    /// The seed already matches the fill color within tolerance.
    SameColor,
    /// `pixels` pixels joined the flood region.
    Filled { pixels: usize },
}

impl FillOutcome {
    pub fn is_filled(self) -> bool {
        matches!(self, FillOutcome::Filled { .. })
    }
}

/// Fills the 4-connected region around (`x`, `y`) whose RGB stays within
/// `tolerance` of the seed pixel. Every candidate is compared against the
/// original seed color, never against already-filled neighbors.
pub fn flood_fill(
    buffer: &mut PixelBuffer,
    x: i64,
    y: i64,
    color: Rgba,
    tolerance: u8,
) -> FillOutcome {
    if !buffer.contains(x, y) {
        debug!("fill seed ({x}, {y}) outside {}x{}", buffer.width(), buffer.height());
        return FillOutcome::OutOfRange;
    }
    let width = buffer.width() as usize;
    let height = buffer.height() as usize;
    let seed_index = buffer.index(x as u32, y as u32);
    let seed = buffer.pixel(seed_index);
    if seed.rgb_within(color, tolerance) {
        debug!("fill seed color {seed} already matches {color}");
        return FillOutcome::SameColor;
    }

    let mut visited = vec![false; width * height];
    let mut stack = Vec::with_capacity(4096);
    stack.push(seed_index);
    let mut filled = 0;

    while let Some(index) = stack.pop() {
        if visited[index] {
            continue;
        }
        visited[index] = true;
        if !buffer.pixel(index).rgb_within(seed, tolerance) {
            continue;
        }
        buffer.set_pixel(index, color);
        filled += 1;

        let px = index % width;
        let py = index / width;
        let neighbors = [
            (px > 0).then(|| index - 1),
            (px + 1 < width).then(|| index + 1),
            (py > 0).then(|| index - width),
            (py + 1 < height).then(|| index + width),
        ];
        for next in neighbors.into_iter().flatten() {
            if !visited[next] {
                stack.push(next);
            }
        }
    }

    FillOutcome::Filled { pixels: filled }
}

/// Grows the fill-colored area by `expand_px` pixels so anti-aliased seams
/// along the original edges get covered. Returns the number of painted pixels.
pub fn expand_fill(buffer: &mut PixelBuffer, color: Rgba, expand_px: u32) -> usize {
    let mask = FillMask::from_color(buffer, color).dilate_by(expand_px);
    mask.paint(buffer, color)
}

/// Flood fill followed by dilation. Dilation only runs when the flood filled something.
pub fn fill_pixels(buffer: &mut PixelBuffer, x: i64, y: i64, options: FillOptions) -> FillOutcome {
    let outcome = flood_fill(buffer, x, y, options.color, options.tolerance);
    if outcome.is_filled() {
        expand_fill(buffer, options.color, options.expand_px);
    }
    outcome
}
