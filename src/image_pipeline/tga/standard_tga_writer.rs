use std::collections::HashMap;
use std::io::Write;

use tracing::debug;

use crate::image_pipeline::atlas::types::AtlasImage;
use crate::image_pipeline::common::error::{AtlasError, Result};
use crate::image_pipeline::tga::rle;
use crate::image_pipeline::tga::types::{AtlasConfig, TgaCompression, TgaPixelFormat};
use crate::image_pipeline::tga::writer::TgaWriter;

const HEADER_LEN: usize = 18;
const MAX_PALETTE: usize = 256;

/// Encodes atlases as TGA with a bottom-left origin and no image ID.
///
/// Atlas samples are read as L, LA, RGB or RGBA depending on the channel
/// count and converted to whatever the requested pixel format stores.
pub struct StandardTgaWriter;

/// Pixel payload ready to be framed by a header.
struct EncodedPixels {
    palette: Vec<u8>,
    palette_len: u16,
    palette_entry_bits: u8,
    pixel_depth: u8,
    alpha_bits: u8,
    bytes_per_pixel: usize,
    data: Vec<u8>,
}

impl TgaWriter for StandardTgaWriter {
    fn write_tga(&self, image: &AtlasImage, output: &mut dyn Write, config: &AtlasConfig) -> Result<()> {
        let format = config.format;
        debug!(
            "Encoding TGA image: {}x{}x{} as format {}",
            image.width,
            image.height,
            image.channels,
            format.code()
        );

        let width = u16::try_from(image.width)
            .map_err(|_| AtlasError::EncodeError(format!("width {} exceeds 65535", image.width)))?;
        let height = u16::try_from(image.height)
            .map_err(|_| AtlasError::EncodeError(format!("height {} exceeds 65535", image.height)))?;

        let encoded = encode_pixels(image, format.pixel)?;

        let mut buffer = Vec::with_capacity(HEADER_LEN + encoded.palette.len() + encoded.data.len());
        buffer.push(0); // image ID length
        buffer.push(u8::from(!encoded.palette.is_empty()));
        buffer.push(format.image_type());
        buffer.extend_from_slice(&0u16.to_le_bytes());
        buffer.extend_from_slice(&encoded.palette_len.to_le_bytes());
        buffer.push(encoded.palette_entry_bits);
        buffer.extend_from_slice(&0u16.to_le_bytes());
        buffer.extend_from_slice(&0u16.to_le_bytes());
        buffer.extend_from_slice(&width.to_le_bytes());
        buffer.extend_from_slice(&height.to_le_bytes());
        buffer.push(encoded.pixel_depth);
        buffer.push(encoded.alpha_bits);

        buffer.extend_from_slice(&encoded.palette);

        match format.compression {
            TgaCompression::None => buffer.extend_from_slice(&encoded.data),
            TgaCompression::Rle => {
                rle::encode(&encoded.data, encoded.bytes_per_pixel, image.width, &mut buffer)
            }
        }

        output.write_all(&buffer)?;

        debug!("TGA encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}

fn encode_pixels(image: &AtlasImage, pixel_format: TgaPixelFormat) -> Result<EncodedPixels> {
    if !(1..=4).contains(&image.channels) {
        return Err(AtlasError::EncodeError(format!(
            "unsupported channel count {}",
            image.channels
        )));
    }

    let has_alpha = image.channels % 2 == 0;
    let pixels = image.data.chunks_exact(image.channels);

    let encoded = match pixel_format {
        TgaPixelFormat::TrueColor => {
            let bytes_per_pixel = if has_alpha { 4 } else { 3 };
            let mut data = Vec::with_capacity(pixels.len() * bytes_per_pixel);
            for px in pixels {
                let [r, g, b, a] = rgba(px);
                data.extend_from_slice(&[b, g, r]);
                if has_alpha {
                    data.push(a);
                }
            }
            EncodedPixels::direct(bytes_per_pixel, if has_alpha { 8 } else { 0 }, data)
        }
        TgaPixelFormat::HighColor => {
            let mut data = Vec::with_capacity(pixels.len() * 2);
            for px in pixels {
                let [r, g, b, a] = rgba(px);
                let mut value = (u16::from(r >> 3) << 10) | (u16::from(g >> 3) << 5) | u16::from(b >> 3);
                if has_alpha && a >= 128 {
                    value |= 0x8000;
                }
                data.extend_from_slice(&value.to_le_bytes());
            }
            EncodedPixels::direct(2, if has_alpha { 1 } else { 0 }, data)
        }
        TgaPixelFormat::Grayscale16 => {
            let mut data = Vec::with_capacity(pixels.len() * 2);
            for px in pixels {
                data.extend_from_slice(&[luma(px), rgba(px)[3]]);
            }
            EncodedPixels::direct(2, 8, data)
        }
        TgaPixelFormat::Grayscale8 => {
            EncodedPixels::direct(1, 0, pixels.map(luma).collect())
        }
        TgaPixelFormat::ColorMapped => {
            let mut indices: HashMap<[u8; 4], u8> = HashMap::new();
            let mut palette = Vec::new();
            let mut data = Vec::with_capacity(pixels.len());
            for px in pixels {
                let color = rgba(px);
                let index = match indices.get(&color) {
                    Some(&index) => index,
                    None => {
                        let index = u8::try_from(indices.len()).map_err(|_| {
                            AtlasError::EncodeError(format!(
                                "atlas has more than {} colors, color-mapped output needs at most {}",
                                MAX_PALETTE, MAX_PALETTE
                            ))
                        })?;
                        let [r, g, b, a] = color;
                        palette.extend_from_slice(&[b, g, r]);
                        if has_alpha {
                            palette.push(a);
                        }
                        indices.insert(color, index);
                        index
                    }
                };
                data.push(index);
            }
            debug!("Built palette of {} colors", indices.len());

            EncodedPixels {
                palette,
                palette_len: indices.len() as u16,
                palette_entry_bits: if has_alpha { 32 } else { 24 },
                pixel_depth: 8,
                alpha_bits: if has_alpha { 8 } else { 0 },
                bytes_per_pixel: 1,
                data,
            }
        }
    };

    Ok(encoded)
}

impl EncodedPixels {
    fn direct(bytes_per_pixel: usize, alpha_bits: u8, data: Vec<u8>) -> Self {
        Self {
            palette: Vec::new(),
            palette_len: 0,
            palette_entry_bits: 0,
            pixel_depth: (bytes_per_pixel * 8) as u8,
            alpha_bits,
            bytes_per_pixel,
            data,
        }
    }
}

fn rgba(px: &[u8]) -> [u8; 4] {
    match *px {
        [l] => [l, l, l, u8::MAX],
        [l, a] => [l, l, l, a],
        [r, g, b] => [r, g, b, u8::MAX],
        [r, g, b, a, ..] => [r, g, b, a],
        [] => [0, 0, 0, u8::MAX],
    }
}

/// Rec.601 luminance; gray input passes through unchanged.
fn luma(px: &[u8]) -> u8 {
    match *px {
        [r, g, b, ..] => {
            ((299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b) + 500) / 1000) as u8
        }
        [l, ..] => l,
        [] => 0,
    }
}
