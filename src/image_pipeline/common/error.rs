use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("{0} - couldn't find sprites")]
    NoSpritesFound(String),

    #[error("{path} - couldn't open: {reason}")]
    SpriteDecodeFailure { path: String, reason: String },

    #[error("Failed to decode TGA image: {0}")]
    DecodeError(String),

    #[error("{path} - sprite is {}x{}x{}, expected {}x{}x{}",
        .found.0, .found.1, .found.2, .expected.0, .expected.1, .expected.2)]
    SpriteSizeMismatch {
        path: String,
        /// `(width, height, channels)` of the reference sprite
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },

    #[error("{path} - couldn't create: {reason}")]
    OutputCreateFailure { path: String, reason: String },

    #[error("{path} - couldn't write: {reason}")]
    OutputWriteFailure { path: String, reason: String },

    #[error("Failed to encode TGA image: {0}")]
    EncodeError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Atlas side {side} exceeds the maximum of {max}")]
    AtlasTooLarge { side: usize, max: usize },

    #[error("Atlas grid is full after {0} sprites")]
    AtlasFull(usize),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AtlasError>;
