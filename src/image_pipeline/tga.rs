//! TGA writing module
//!
//! This module encodes the finished atlas as a TGA file in one of ten
//! pixel-format and compression combinations.

mod writer;
mod standard_tga_writer;
mod rle;
pub mod types;


pub use writer::TgaWriter;
pub use standard_tga_writer::StandardTgaWriter;
pub use types::{TgaFormat, TgaPixelFormat, TgaCompression, AtlasConfig, AtlasConfigBuilder};
