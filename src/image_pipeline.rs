//! Sprite atlas pipeline module
//!
//! This module splits atlas building into sprite reading, grid packing,
//! TGA writing and the orchestration that ties them together.

pub mod sprite;
pub mod atlas;
pub mod tga;
pub mod conversions;
pub mod common;

pub use common::{
    AtlasError,
    Result,
};

pub use sprite::{
    SourceImage,
    SpriteReader,
    ImageTgaReader,
    SpriteSequence,
};

pub use atlas::{
    AtlasImage,
    AtlasLayout,
    GridPacker,
    Placement,
    PlacementCursor,
    PlacementGrid,
    UvMapWriter,
    UvRect,
    UV_MAP_VERSION,
};

pub use tga::{
    TgaFormat,
    TgaPixelFormat,
    TgaCompression,
    AtlasConfig,
    AtlasConfigBuilder,
    TgaWriter,
    StandardTgaWriter,
};

pub use conversions::{
    AtlasSummary,
    PackedAtlas,
    PipelineTimings,
    SpriteAtlasPipeline,
    StepTiming,
    Timer,
};
