//! Atlas data types

/// The packed texture. Rows are stored bottom row first, like [`SourceImage`].
///
/// [`SourceImage`]: crate::image_pipeline::SourceImage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasImage {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<u8>,
}

impl AtlasImage {
    /// Allocates a zero-filled square atlas.
    pub fn new(side: usize, channels: usize) -> Self {
        Self {
            width: side,
            height: side,
            channels,
            data: vec![0u8; side * side * channels],
        }
    }

    pub fn row_bytes(&self) -> usize {
        self.width * self.channels
    }
}

/// Number of whole cells that fit along each side of the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementGrid {
    pub columns: usize,
    pub rows: usize,
}

impl PlacementGrid {
    pub fn for_cell(side: usize, cell_width: usize, cell_height: usize) -> Self {
        Self {
            columns: side / cell_width,
            rows: side / cell_height,
        }
    }

    pub fn capacity(&self) -> usize {
        self.columns.saturating_mul(self.rows)
    }
}

/// Where the next sprite goes.
///
/// `byte_offset` addresses the first byte of the cell's first stored row;
/// `column_index` counts the cells filled in the current grid row, including
/// the one the cursor points at (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementCursor {
    pub byte_offset: usize,
    pub column_index: usize,
}

/// Normalized rectangle of a sprite inside the atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub u1: f32,
    pub v1: f32,
    pub u2: f32,
    pub v2: f32,
}

impl UvRect {
    /// Little-endian `u1, v1, u2, v2`, the coordinate file record layout.
    pub fn to_le_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        for (chunk, value) in bytes.chunks_exact_mut(4).zip([self.u1, self.v1, self.u2, self.v2]) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Pixel bounds `(x1, y1, x2, y2)` in an atlas of the given side.
    pub fn to_pixels(&self, side: usize) -> (usize, usize, usize, usize) {
        let scale = side as f32;
        (
            (self.u1 * scale).round() as usize,
            (self.v1 * scale).round() as usize,
            (self.u2 * scale).round() as usize,
            (self.v2 * scale).round() as usize,
        )
    }
}
