//! Decoding fetched image payloads into something egui can upload.

use egui::ColorImage;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageDecodeError {
    #[error("image could not be decoded: {0}")]
    Decode(String),

    #[error("image has no pixels")]
    Empty,
}

/// Decoded RGBA pixels, 4 bytes per pixel.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub width: usize,
    pub height: usize,
    pub bytes: Vec<u8>,
}

impl ImageData {
    pub fn new(width: usize, height: usize, bytes: Vec<u8>) -> Self {
        Self {
            width,
            height,
            bytes,
        }
    }

    /// Decode an encoded payload (PNG) to RGBA.
    pub fn decode(encoded: &[u8]) -> Result<Self, ImageDecodeError> {
        let decoded = image::load_from_memory(encoded)
            .map_err(|e| ImageDecodeError::Decode(e.to_string()))?
            .to_rgba8();

        let (width, height) = decoded.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageDecodeError::Empty);
        }

        Ok(Self::new(
            width as usize,
            height as usize,
            decoded.into_raw(),
        ))
    }

    pub fn size(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    pub fn to_color_image(&self) -> ColorImage {
        ColorImage::from_rgba_unmultiplied(self.size(), &self.bytes)
    }
}
