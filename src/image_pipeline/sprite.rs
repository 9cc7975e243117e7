//! Sprite reading module
//!
//! This module discovers numbered sprite sequences and decodes the individual
//! sprite images into a uniform pixel layout.

mod reader;
mod image_reader;
mod discovery;
pub mod types;


pub use reader::SpriteReader;
pub use image_reader::ImageTgaReader;
pub use discovery::SpriteSequence;
pub use types::SourceImage;
