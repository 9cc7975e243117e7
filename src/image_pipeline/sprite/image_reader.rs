//! TGA sprite reader backed by the `image` crate.
//!
//! The decoder handles color-mapped, true-color and grayscale TGA files, both
//! raw and run-length encoded. Its output is normalized here to the layout the
//! packer expects: 8-bit samples, 1 to 4 channels, bottom row first.

use image::{DynamicImage, ImageFormat};
use tracing::debug;

use crate::image_pipeline::common::error::{AtlasError, Result};
use crate::image_pipeline::sprite::reader::SpriteReader;
use crate::image_pipeline::sprite::types::SourceImage;

pub struct ImageTgaReader;

impl SpriteReader for ImageTgaReader {
    /// Decodes a TGA file held in memory.
    ///
    /// Luma, luma+alpha, RGB and RGBA images keep their channel count; any
    /// other decoded layout is converted to RGBA.
    fn read_sprite(&self, data: &[u8]) -> Result<SourceImage> {
        debug!("Decoding TGA sprite, {} bytes", data.len());

        let decoded = image::load_from_memory_with_format(data, ImageFormat::Tga)
            .map_err(|e| AtlasError::DecodeError(e.to_string()))?;

        let (width, height, channels, top_down) = match decoded {
            DynamicImage::ImageLuma8(buffer) => (buffer.width(), buffer.height(), 1, buffer.into_raw()),
            DynamicImage::ImageLumaA8(buffer) => (buffer.width(), buffer.height(), 2, buffer.into_raw()),
            DynamicImage::ImageRgb8(buffer) => (buffer.width(), buffer.height(), 3, buffer.into_raw()),
            DynamicImage::ImageRgba8(buffer) => (buffer.width(), buffer.height(), 4, buffer.into_raw()),
            other => {
                let buffer = other.to_rgba8();
                (buffer.width(), buffer.height(), 4, buffer.into_raw())
            }
        };
        let (width, height) = (width as usize, height as usize);

        debug!("Decoded sprite: {}x{}x{}", width, height, channels);

        // image hands rows out top row first
        let data = flip_rows(top_down, width * channels);

        SourceImage::new(width, height, channels, data)
    }
}

fn flip_rows(data: Vec<u8>, stride: usize) -> Vec<u8> {
    if stride == 0 {
        return data;
    }
    data.chunks_exact(stride).rev().flatten().copied().collect()
}
