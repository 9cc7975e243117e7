//! Atlas packing module
//!
//! Sizes a square power-of-two atlas for a run of equally sized sprites, lays
//! them out on a uniform grid and computes the texture rectangle of each cell.

mod dimensioner;
mod packer;
mod uv_map;
pub mod types;


pub use dimensioner::{AtlasLayout, next_power_of_two};
pub use packer::{GridPacker, Placement};
pub use uv_map::{UvMapWriter, UV_MAP_VERSION, uv_rect};
pub use types::{AtlasImage, PlacementCursor, PlacementGrid, UvRect};
