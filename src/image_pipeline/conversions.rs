//! Pipeline conversions module
//!
//! This module contains the orchestration that turns a sprite sequence into
//! an atlas image and its coordinate file.

mod sprites_to_atlas;
mod timing;

#[cfg(test)]
mod tests;

pub use sprites_to_atlas::{AtlasSummary, PackedAtlas, SpriteAtlasPipeline};
pub use timing::{PipelineTimings, StepTiming, Timer};
