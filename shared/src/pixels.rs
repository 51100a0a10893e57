use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bincode::{Decode, Encode};
use image::codecs::jpeg::JpegEncoder;
use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::CanvasError;

#[cfg(test)]
#[path = "pixels_test.rs"]
mod pixels_test;

const JPEG_QUALITY: u8 = 100;

/// Row-major RGBA8 raster of the whole canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, fill: Rgba) -> Self {
        let pixel = fill.to_array();
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * 4);
        for _ in 0..count {
            data.extend_from_slice(&pixel);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CanvasError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(CanvasError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    pub fn get(&self, x: u32, y: u32) -> Rgba {
        self.pixel(self.index(x, y))
    }

    pub fn put(&mut self, x: u32, y: u32, color: Rgba) {
        let index = self.index(x, y);
        self.set_pixel(index, color);
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Number of pixels whose RGBA equals `color` exactly.
    pub fn count_color(&self, color: Rgba) -> usize {
        let target = color.to_array();
        self.data.chunks_exact(4).filter(|px| *px == target).count()
    }

    /// Source-over blend of `color` onto the pixel at (`x`, `y`).
    pub fn blend(&mut self, x: u32, y: u32, color: Rgba) {
        if color.a == 255 {
            self.put(x, y, color);
            return;
        }
        if color.a == 0 {
            return;
        }
        let under = self.get(x, y);
        let src_a = u32::from(color.a);
        let dst_a = u32::from(under.a) * (255 - src_a) / 255;
        let out_a = src_a + dst_a;
        let mix = |src: u8, dst: u8| {
            ((u32::from(src) * src_a + u32::from(dst) * dst_a) / out_a.max(1)) as u8
        };
        self.put(
            x,
            y,
            Rgba::new(
                mix(color.r, under.r),
                mix(color.g, under.g),
                mix(color.b, under.b),
                out_a as u8,
            ),
        );
    }

    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub(crate) fn pixel(&self, index: usize) -> Rgba {
        let offset = index * 4;
        Rgba::new(
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        )
    }

    pub(crate) fn set_pixel(&mut self, index: usize, color: Rgba) {
        let offset = index * 4;
        self.data[offset..offset + 4].copy_from_slice(&color.to_array());
    }

    pub fn encode(&self, format: ImageFormat) -> Result<EncodedImage, CanvasError> {
        let image = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| CanvasError::Encode("raster does not match its dimensions".into()))?;
        let mut bytes = Vec::new();
        let mut cursor = Cursor::new(&mut bytes);
        let result = match format {
            ImageFormat::Png => image.write_to(&mut cursor, image::ImageFormat::Png),
            ImageFormat::Jpeg => {
                let rgb = image::DynamicImage::ImageRgba8(image).to_rgb8();
                JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY).encode_image(&rgb)
            }
        };
        result.map_err(|error| CanvasError::Encode(error.to_string()))?;
        Ok(EncodedImage { format, bytes })
    }

    pub fn encode_png(&self) -> Result<EncodedImage, CanvasError> {
        self.encode(ImageFormat::Png)
    }

    pub fn decode(image: &EncodedImage) -> Result<Self, CanvasError> {
        let decoded = image::load_from_memory(&image.bytes)
            .map_err(|error| CanvasError::Decode(error.to_string()))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        Self::from_rgba(width, height, decoded.into_raw())
    }
}

/// One flag per pixel marking fill coverage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FillMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl FillMask {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    /// Marks pixels whose RGB equals `color` at full alpha.
    pub fn from_color(buffer: &PixelBuffer, color: Rgba) -> Self {
        let target = color.with_alpha(255);
        let bits = (0..buffer.len())
            .map(|index| buffer.pixel(index) == target)
            .collect();
        Self {
            width: buffer.width(),
            height: buffer.height(),
            bits,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        self.bits[y as usize * self.width as usize + x as usize]
    }

    pub fn set(&mut self, x: u32, y: u32) {
        let index = y as usize * self.width as usize + x as usize;
        self.bits[index] = true;
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|bit| **bit).count()
    }

    pub fn is_superset_of(&self, other: &FillMask) -> bool {
        self.bits.len() == other.bits.len()
            && self.bits.iter().zip(&other.bits).all(|(mine, theirs)| *mine || !*theirs)
    }

    /// One step of 4-connected dilation. Border pixels only look at in-bounds neighbors.
    pub fn dilate(&self) -> FillMask {
        let w = self.width as usize;
        let h = self.height as usize;
        let mut grown = self.bits.clone();
        for y in 0..h {
            for x in 0..w {
                let i = y * w + x;
                if self.bits[i] {
                    continue;
                }
                let left = x > 0 && self.bits[i - 1];
                let right = x + 1 < w && self.bits[i + 1];
                let up = y > 0 && self.bits[i - w];
                let down = y + 1 < h && self.bits[i + w];
                if left || right || up || down {
                    grown[i] = true;
                }
            }
        }
        FillMask {
            width: self.width,
            height: self.height,
            bits: grown,
        }
    }

    pub fn dilate_by(&self, steps: u32) -> FillMask {
        let mut mask = self.clone();
        for _ in 0..steps {
            mask = mask.dilate();
        }
        mask
    }

    /// Paints every marked pixel with `color` at full alpha.
    pub fn paint(&self, buffer: &mut PixelBuffer, color: Rgba) -> usize {
        let color = color.with_alpha(255);
        let mut painted = 0;
        for (index, bit) in self.bits.iter().enumerate() {
            if *bit {
                buffer.set_pixel(index, color);
                painted += 1;
            }
        }
        painted
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }
}

/// Compressed image bytes tagged with their format.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime(),
            STANDARD.encode(&self.bytes)
        )
    }

    pub fn from_data_url(url: &str) -> Result<Self, CanvasError> {
        let rest = url.trim().strip_prefix("data:").ok_or(CanvasError::DataUrl)?;
        let (header, payload) = rest.split_once(',').ok_or(CanvasError::DataUrl)?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or(CanvasError::DataUrl)?;
        let format = ImageFormat::from_mime(mime).ok_or(CanvasError::DataUrl)?;
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|_| CanvasError::DataUrl)?;
        Ok(Self { format, bytes })
    }
}
