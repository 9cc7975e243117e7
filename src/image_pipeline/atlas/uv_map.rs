//! Texture coordinates of placed sprites and the `.ltc` file that stores them.

use std::io::Write;

use tracing::debug;

use crate::image_pipeline::atlas::dimensioner::AtlasLayout;
use crate::image_pipeline::atlas::types::{PlacementCursor, UvRect};
use crate::image_pipeline::common::error::{AtlasError, Result};

/// Version stamped into the coordinate file header.
pub const UV_MAP_VERSION: i32 = 1;

/// Normalized rectangle of the cell `cursor` points at.
///
/// Horizontal bounds come from the cell's column; vertical bounds count grid
/// rows from the end of the pixel buffer, so the first grid row filled spans
/// `v = 0 .. cell_height / side`.
pub fn uv_rect(layout: &AtlasLayout, cursor: PlacementCursor) -> UvRect {
    let side = layout.side;
    let pixel = cursor.byte_offset / layout.channels;

    let x1 = (pixel + side * (layout.cell_height - 1)) % side;
    let y2 = (side * side - pixel).div_ceil(side);
    let x2 = x1 + layout.cell_width;
    let y1 = y2 - layout.cell_height;

    let scale = side as f32;
    UvRect {
        u1: x1 as f32 / scale,
        v1: y1 as f32 / scale,
        u2: x2 as f32 / scale,
        v2: y2 as f32 / scale,
    }
}

/// Streams the coordinate file: `i32` version, `i32` sprite count, then one
/// 16-byte [`UvRect`] record per sprite, all little-endian.
pub struct UvMapWriter<'a> {
    output: &'a mut dyn Write,
    expected: usize,
    written: usize,
}

impl<'a> UvMapWriter<'a> {
    /// Writes the header for `sprite_count` records.
    pub fn new(output: &'a mut dyn Write, sprite_count: usize) -> Result<Self> {
        let count = i32::try_from(sprite_count).map_err(|_| {
            AtlasError::EncodeError(format!(
                "{} sprites do not fit the coordinate file header",
                sprite_count
            ))
        })?;

        output.write_all(&UV_MAP_VERSION.to_le_bytes())?;
        output.write_all(&count.to_le_bytes())?;

        Ok(Self {
            output,
            expected: sprite_count,
            written: 0,
        })
    }

    pub fn write_rect(&mut self, uv: &UvRect) -> Result<()> {
        self.output.write_all(&uv.to_le_bytes())?;
        self.written += 1;
        Ok(())
    }

    /// Flushes the stream and checks that the header's count was honored.
    pub fn finish(self) -> Result<()> {
        self.output.flush()?;
        if self.written != self.expected {
            return Err(AtlasError::EncodeError(format!(
                "coordinate file holds {} of {} records",
                self.written, self.expected
            )));
        }
        debug!("Wrote {} UV records", self.written);
        Ok(())
    }
}
