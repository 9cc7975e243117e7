use std::io::Write;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::atlas::types::AtlasImage;
use crate::image_pipeline::tga::types::AtlasConfig;

pub trait TgaWriter {
    fn write_tga(&self, image: &AtlasImage, output: &mut dyn Write, config: &AtlasConfig) -> Result<()>;
}
