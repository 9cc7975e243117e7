//! TGA output format and atlas configuration types

use std::fmt;
use std::str::FromStr;

use crate::image_pipeline::common::error::AtlasError;

/// Pixel layouts the TGA writer can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TgaPixelFormat {
    /// 8-bit indices into a 24-bit or 32-bit palette
    ColorMapped,
    /// 24-bit BGR, or 32-bit BGRA when the atlas has alpha
    TrueColor,
    /// 15-bit RGB, or 16-bit with a 1-bit alpha when the atlas has alpha
    HighColor,
    /// 8-bit luminance plus 8-bit alpha
    Grayscale16,
    /// 8-bit luminance
    Grayscale8,
}

/// TGA compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TgaCompression {
    /// Raw pixel data
    None,
    /// Run-length encoded packets, never crossing a scanline
    Rle,
}

/// One of the ten selectable output variants, numbered 0 to 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TgaFormat {
    pub pixel: TgaPixelFormat,
    pub compression: TgaCompression,
}

const PIXEL_FORMATS: [TgaPixelFormat; 5] = [
    TgaPixelFormat::ColorMapped,
    TgaPixelFormat::TrueColor,
    TgaPixelFormat::HighColor,
    TgaPixelFormat::Grayscale16,
    TgaPixelFormat::Grayscale8,
];

impl TgaFormat {
    pub const fn new(pixel: TgaPixelFormat, compression: TgaCompression) -> Self {
        Self { pixel, compression }
    }

    /// Codes 0-4 are uncompressed, 5-9 the run-length encoded counterparts.
    pub fn from_code(code: u8) -> Option<Self> {
        let pixel = *PIXEL_FORMATS.get(usize::from(code % 5))?;
        let compression = match code / 5 {
            0 => TgaCompression::None,
            1 => TgaCompression::Rle,
            _ => return None,
        };
        Some(Self::new(pixel, compression))
    }

    pub fn code(&self) -> u8 {
        let pixel = match self.pixel {
            TgaPixelFormat::ColorMapped => 0,
            TgaPixelFormat::TrueColor => 1,
            TgaPixelFormat::HighColor => 2,
            TgaPixelFormat::Grayscale16 => 3,
            TgaPixelFormat::Grayscale8 => 4,
        };
        match self.compression {
            TgaCompression::None => pixel,
            TgaCompression::Rle => pixel + 5,
        }
    }

    pub fn all() -> impl Iterator<Item = TgaFormat> {
        (0..10).filter_map(TgaFormat::from_code)
    }

    /// TGA header image type: 1-3 raw, 9-11 run-length encoded.
    pub fn image_type(&self) -> u8 {
        let base = match self.pixel {
            TgaPixelFormat::ColorMapped => 1,
            TgaPixelFormat::TrueColor | TgaPixelFormat::HighColor => 2,
            TgaPixelFormat::Grayscale16 | TgaPixelFormat::Grayscale8 => 3,
        };
        match self.compression {
            TgaCompression::None => base,
            TgaCompression::Rle => base + 8,
        }
    }
}

impl Default for TgaFormat {
    fn default() -> Self {
        Self::new(TgaPixelFormat::TrueColor, TgaCompression::None)
    }
}

impl fmt::Display for TgaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let compression = match self.compression {
            TgaCompression::None => "Uncompressed",
            TgaCompression::Rle => "Run-length encoded",
        };
        let pixel = match self.pixel {
            TgaPixelFormat::ColorMapped => "8-bit color-mapped image",
            TgaPixelFormat::TrueColor => "24-bit or 32-bit true-color image",
            TgaPixelFormat::HighColor => "15-bit or 16-bit true-color image",
            TgaPixelFormat::Grayscale16 => "16-bit black-and-white image",
            TgaPixelFormat::Grayscale8 => "8-bit black-and-white image",
        };
        write!(f, "{}, {}.", compression, pixel)
    }
}

impl FromStr for TgaFormat {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(TgaFormat::from_code)
            .ok_or_else(|| AtlasError::UnsupportedFormat(format!("{:?} is not a format code 0-9", s)))
    }
}

/// Configuration for building an atlas
#[derive(Debug, Clone)]
pub struct AtlasConfig {
    /// Output pixel format and compression
    pub format: TgaFormat,
    /// Whether to write the `.ltc` texture coordinate file next to the atlas
    pub emit_coordinates: bool,
    /// Whether to enforce `max_side` on the computed atlas
    pub validate_dimensions: bool,
    /// Largest atlas side accepted when validating
    pub max_side: Option<usize>,
}

/// Largest power of two a TGA header can describe.
pub const DEFAULT_MAX_SIDE: usize = 32768;

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            format: TgaFormat::default(),
            emit_coordinates: true,
            validate_dimensions: true,
            max_side: Some(DEFAULT_MAX_SIDE),
        }
    }
}

impl AtlasConfig {
    pub fn builder() -> AtlasConfigBuilder {
        AtlasConfigBuilder::default()
    }

    /// Side limit handed to the dimensioner, if validation is on.
    pub fn effective_max_side(&self) -> Option<usize> {
        if self.validate_dimensions {
            self.max_side
        } else {
            None
        }
    }
}

/// Builder for AtlasConfig
#[derive(Default)]
pub struct AtlasConfigBuilder {
    format: Option<TgaFormat>,
    emit_coordinates: Option<bool>,
    validate_dimensions: Option<bool>,
    max_side: Option<Option<usize>>,
}

impl AtlasConfigBuilder {
    pub fn format(mut self, format: TgaFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn emit_coordinates(mut self, enable: bool) -> Self {
        self.emit_coordinates = Some(enable);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_side(mut self, max: Option<usize>) -> Self {
        self.max_side = Some(max);
        self
    }

    pub fn build(self) -> AtlasConfig {
        let default = AtlasConfig::default();
        AtlasConfig {
            format: self.format.unwrap_or(default.format),
            emit_coordinates: self.emit_coordinates.unwrap_or(default.emit_coordinates),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_side: self.max_side.unwrap_or(default.max_side),
        }
    }
}
