use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::sprite::types::SourceImage;

pub trait SpriteReader {
    fn read_sprite(&self, data: &[u8]) -> Result<SourceImage>;
}
