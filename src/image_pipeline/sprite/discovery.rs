use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::debug;

/// A run of sprite files `<base>0.tga`, `<base>1.tga`, ... sharing one base name.
///
/// The base may carry directory components; it is extended textually, so
/// `assets/walk` names `assets/walk0.tga` and produces `assets/walk.tga`.
#[derive(Debug, Clone)]
pub struct SpriteSequence {
    base: PathBuf,
}

impl SpriteSequence {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn sprite_path(&self, index: usize) -> PathBuf {
        self.with_suffix(&format!("{}.tga", index))
    }

    pub fn atlas_path(&self) -> PathBuf {
        self.with_suffix(".tga")
    }

    pub fn uv_map_path(&self) -> PathBuf {
        self.with_suffix(".tga.ltc")
    }

    /// Counts the sprites numbered contiguously from zero.
    ///
    /// Probing stops at the first index whose file cannot be opened, so a gap
    /// hides every sprite after it.
    pub fn count(&self) -> usize {
        let mut sprites = 0;
        while File::open(self.sprite_path(sprites)).is_ok() {
            sprites += 1;
        }
        debug!("Found {} sprites for {}", sprites, self.base.display());
        sprites
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut path = OsString::from(self.base.as_os_str());
        path.push(suffix);
        PathBuf::from(path)
    }
}
