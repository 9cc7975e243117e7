//! Sprite image types

use crate::image_pipeline::common::error::{AtlasError, Result};

/// A decoded sprite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Interleaved 8-bit samples per pixel: 1 (L), 2 (LA), 3 (RGB) or 4 (RGBA)
    pub channels: usize,
    /// Pixel rows, bottom row first
    pub data: Vec<u8>,
}

impl SourceImage {
    pub fn new(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        if !(1..=4).contains(&channels) {
            return Err(AtlasError::DecodeError(format!(
                "unsupported channel count {}",
                channels
            )));
        }
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(AtlasError::DecodeError(format!(
                "pixel buffer holds {} bytes, {}x{}x{} needs {}",
                data.len(),
                width,
                height,
                channels,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// `(width, height, channels)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.channels)
    }

    /// Length of one pixel row in bytes.
    pub fn row_bytes(&self) -> usize {
        self.width * self.channels
    }
}
