use tracing::{debug, trace};

use crate::image_pipeline::atlas::dimensioner::AtlasLayout;
use crate::image_pipeline::atlas::types::{AtlasImage, PlacementCursor, UvRect};
use crate::image_pipeline::atlas::uv_map::uv_rect;
use crate::image_pipeline::common::error::{AtlasError, Result};
use crate::image_pipeline::sprite::types::SourceImage;

impl PlacementCursor {
    /// Column 0 of the grid row at the end of the buffer.
    pub fn start(layout: &AtlasLayout) -> Self {
        Self {
            byte_offset: layout.atlas_bytes() - layout.grid_row_bytes(),
            column_index: 1,
        }
    }

    /// Moves to the next cell: right along the row, then back to column 0 of
    /// the grid row before it in the buffer. `None` once every cell is used.
    pub fn advance(self, layout: &AtlasLayout) -> Option<Self> {
        if self.column_index < layout.grid.columns {
            return Some(Self {
                byte_offset: self.byte_offset + layout.cell_row_bytes(),
                column_index: self.column_index + 1,
            });
        }

        let byte_offset = self
            .byte_offset
            .checked_sub(layout.grid_row_bytes())?
            .checked_sub(layout.cell_row_bytes() * (self.column_index - 1))?;

        Some(Self {
            byte_offset,
            column_index: 1,
        })
    }
}

/// One sprite's landing spot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Position in the sprite sequence
    pub index: usize,
    pub cursor: PlacementCursor,
    pub uv: UvRect,
}

/// Copies sprites into a zeroed atlas, one grid cell each, in arrival order.
pub struct GridPacker {
    layout: AtlasLayout,
    atlas: AtlasImage,
    cursor: Option<PlacementCursor>,
    placed: usize,
}

impl GridPacker {
    pub fn new(layout: AtlasLayout) -> Self {
        Self {
            atlas: AtlasImage::new(layout.side, layout.channels),
            cursor: Some(PlacementCursor::start(&layout)),
            layout,
            placed: 0,
        }
    }

    pub fn layout(&self) -> &AtlasLayout {
        &self.layout
    }

    pub fn placed(&self) -> usize {
        self.placed
    }

    /// Copies `sprite` into the next free cell.
    ///
    /// The sprite must match the cell's width, height and channel count; a
    /// mismatch is reported as [`AtlasError::SpriteSizeMismatch`] naming the
    /// sprite by index.
    pub fn place(&mut self, sprite: &SourceImage) -> Result<Placement> {
        let expected = (self.layout.cell_width, self.layout.cell_height, self.layout.channels);
        if sprite.shape() != expected {
            return Err(AtlasError::SpriteSizeMismatch {
                path: format!("sprite {}", self.placed),
                expected,
                found: sprite.shape(),
            });
        }

        let cursor = self.cursor.ok_or(AtlasError::AtlasFull(self.placed))?;

        let stride = self.layout.row_stride();
        let row_bytes = self.layout.cell_row_bytes();
        for (j, row) in sprite.data.chunks_exact(row_bytes).enumerate() {
            let start = cursor.byte_offset + stride * j;
            self.atlas.data[start..start + row_bytes].copy_from_slice(row);
        }

        let uv = uv_rect(&self.layout, cursor);
        let placement = Placement {
            index: self.placed,
            cursor,
            uv,
        };

        trace!(
            "Sprite {} at byte {} (column {}), uv {:?}",
            placement.index, cursor.byte_offset, cursor.column_index, uv
        );

        self.cursor = cursor.advance(&self.layout);
        self.placed += 1;
        Ok(placement)
    }

    pub fn finish(self) -> AtlasImage {
        debug!(
            "Packed {} sprites, {} cells left empty",
            self.placed,
            self.layout.grid.capacity() - self.placed
        );
        self.atlas
    }
}
