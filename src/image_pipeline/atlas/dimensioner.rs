use tracing::{debug, warn};

use crate::image_pipeline::atlas::types::PlacementGrid;
use crate::image_pipeline::common::error::{AtlasError, Result};
use crate::image_pipeline::sprite::types::SourceImage;

/// Smallest power of two that is `>= n` (1 for 0).
pub fn next_power_of_two(n: usize) -> usize {
    n.next_power_of_two()
}

/// Geometry of one packing run, fixed by the reference sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasLayout {
    /// Width and height of the square atlas
    pub side: usize,
    pub cell_width: usize,
    pub cell_height: usize,
    pub channels: usize,
    pub grid: PlacementGrid,
}

impl AtlasLayout {
    /// Sizes the atlas for `sprite_count` cells shaped like `reference`.
    ///
    /// Starts from the power of two covering the reference's larger side and
    /// doubles until the grid can hold every sprite. `max_side` caps the
    /// search; `None` lets it grow without bound.
    pub fn for_sprites(
        reference: &SourceImage,
        sprite_count: usize,
        max_side: Option<usize>,
    ) -> Result<Self> {
        let (cell_width, cell_height) = (reference.width, reference.height);
        if cell_width == 0 || cell_height == 0 {
            return Err(AtlasError::InvalidDimensions(cell_width, cell_height));
        }

        let mut side = next_power_of_two(cell_width.max(cell_height));
        let mut grid = PlacementGrid::for_cell(side, cell_width, cell_height);

        while grid.capacity() < sprite_count {
            side = side.checked_mul(2).ok_or(AtlasError::AtlasTooLarge {
                side,
                max: max_side.unwrap_or(usize::MAX),
            })?;
            grid = PlacementGrid::for_cell(side, cell_width, cell_height);
        }

        if let Some(max) = max_side {
            if side > max {
                warn!(
                    "{} sprites of {}x{} need a {}x{} atlas, maximum is {}",
                    sprite_count, cell_width, cell_height, side, side, max
                );
                return Err(AtlasError::AtlasTooLarge { side, max });
            }
        }

        debug!(
            "Atlas {}x{}: {} columns x {} rows of {}x{} cells",
            side, side, grid.columns, grid.rows, cell_width, cell_height
        );

        Ok(Self {
            side,
            cell_width,
            cell_height,
            channels: reference.channels,
            grid,
        })
    }

    pub fn atlas_bytes(&self) -> usize {
        self.side * self.side * self.channels
    }

    /// Destination stride between two stored rows.
    pub fn row_stride(&self) -> usize {
        self.side * self.channels
    }

    /// Bytes in one stored row of a cell.
    pub fn cell_row_bytes(&self) -> usize {
        self.cell_width * self.channels
    }

    /// Bytes spanned by one full grid row.
    pub fn grid_row_bytes(&self) -> usize {
        self.row_stride() * self.cell_height
    }
}
