use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::image_pipeline::{
    atlas::{AtlasImage, AtlasLayout, GridPacker, UvMapWriter, UvRect},
    common::error::{AtlasError, Result},
    conversions::timing::{PipelineTimings, Timer},
    sprite::{ImageTgaReader, SourceImage, SpriteReader, SpriteSequence},
    tga::{AtlasConfig, StandardTgaWriter, TgaWriter},
};

/// Result of packing a sprite run in memory.
#[derive(Debug, Clone)]
pub struct PackedAtlas {
    pub atlas: AtlasImage,
    pub layout: AtlasLayout,
    /// One rectangle per sprite, in sprite order
    pub uvs: Vec<UvRect>,
}

/// What a file-based build produced.
#[derive(Debug)]
pub struct AtlasSummary {
    pub sprite_count: usize,
    pub layout: AtlasLayout,
    pub atlas_path: PathBuf,
    pub uv_map_path: Option<PathBuf>,
    pub timings: PipelineTimings,
}

pub struct SpriteAtlasPipeline<R: SpriteReader, W: TgaWriter> {
    reader: R,
    writer: W,
    config: AtlasConfig,
}

impl SpriteAtlasPipeline<ImageTgaReader, StandardTgaWriter> {
    pub fn new(config: AtlasConfig) -> Self {
        Self {
            reader: ImageTgaReader,
            writer: StandardTgaWriter,
            config,
        }
    }
}

impl<R: SpriteReader, W: TgaWriter> SpriteAtlasPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: AtlasConfig) -> Self {
        Self {
            reader,
            writer,
            config,
        }
    }

    /// Reads and decodes one sprite file; any failure names the path.
    pub fn read_sprite_file(&self, path: &Path) -> Result<SourceImage> {
        let decode_failure = |reason: String| AtlasError::SpriteDecodeFailure {
            path: path.display().to_string(),
            reason,
        };

        let data = std::fs::read(path).map_err(|e| decode_failure(e.to_string()))?;
        self.reader
            .read_sprite(&data)
            .map_err(|e| decode_failure(e.to_string()))
    }

    /// Packs `sprite_count` sprites obtained from `load`, in index order.
    ///
    /// Sprite 0 fixes the cell size and channel count. Each sprite is dropped
    /// as soon as it has been copied. When `uv_map` is given every placement's
    /// rectangle is streamed to it as well.
    #[instrument(skip(self, load, uv_map))]
    pub fn pack<F>(
        &self,
        sprite_count: usize,
        mut load: F,
        mut uv_map: Option<&mut UvMapWriter<'_>>,
    ) -> Result<PackedAtlas>
    where
        F: FnMut(usize) -> Result<SourceImage>,
    {
        if sprite_count == 0 {
            return Err(AtlasError::NoSpritesFound(String::from("sprite set")));
        }

        let reference = load(0)?;
        let layout = {
            let _span = tracing::info_span!("size_atlas",
                cell_width = reference.width,
                cell_height = reference.height
            ).entered();
            AtlasLayout::for_sprites(&reference, sprite_count, self.config.effective_max_side())?
        };

        let mut packer = GridPacker::new(layout);
        let mut uvs = Vec::with_capacity(sprite_count);
        let mut next = Some(reference);

        for index in 0..sprite_count {
            let sprite = match next.take() {
                Some(sprite) => sprite,
                None => load(index)?,
            };

            let placement = packer.place(&sprite)?;
            debug!(
                "Placed sprite {} at column {}",
                placement.index, placement.cursor.column_index
            );

            if let Some(uv_map) = uv_map.as_deref_mut() {
                uv_map.write_rect(&placement.uv)?;
            }
            uvs.push(placement.uv);
        }

        Ok(PackedAtlas {
            atlas: packer.finish(),
            layout,
            uvs,
        })
    }

    /// Builds `<base>.tga` (and `<base>.tga.ltc` unless disabled) from the
    /// sprites `<base>0.tga`, `<base>1.tga`, ...
    ///
    /// The atlas file is only created once encoding succeeded. The coordinate
    /// file is opened before packing and may be left incomplete on failure.
    #[instrument(skip(self, base))]
    pub fn build_atlas<P: AsRef<Path>>(&self, base: P) -> Result<AtlasSummary> {
        let sequence = SpriteSequence::new(base.as_ref());
        let mut timings = PipelineTimings::new();

        info!(
            base = %sequence.base().display(),
            format = self.config.format.code(),
            "Building atlas"
        );

        let timer = Timer::start("discover_sprites");
        let sprite_count = sequence.count();
        timer.record(&mut timings);

        if sprite_count == 0 {
            return Err(AtlasError::NoSpritesFound(sequence.base().display().to_string()));
        }
        info!(sprites = sprite_count, "Discovered sprites");

        let uv_map_path = self.config.emit_coordinates.then(|| sequence.uv_map_path());
        let mut uv_file = match &uv_map_path {
            Some(path) => {
                let timer = Timer::start("create_uv_map");
                let file = File::create(path).map_err(|e| AtlasError::OutputCreateFailure {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                timer.record(&mut timings);
                Some(BufWriter::new(file))
            }
            None => None,
        };
        // `UvMapWriter` only sees a stream; failed writes get the file's path here.
        let uv_write_failure = |e: AtlasError| match (e, &uv_map_path) {
            (AtlasError::IoError(e), Some(path)) => AtlasError::OutputWriteFailure {
                path: path.display().to_string(),
                reason: e.to_string(),
            },
            (other, _) => other,
        };
        let mut uv_map = match uv_file.as_mut() {
            Some(file) => Some(UvMapWriter::new(file, sprite_count).map_err(uv_write_failure)?),
            None => None,
        };

        let timer = Timer::start("pack_sprites");
        let mut current = PathBuf::new();
        let packed = self
            .pack(
                sprite_count,
                |index| {
                    current = sequence.sprite_path(index);
                    self.read_sprite_file(&current)
                },
                uv_map.as_mut(),
            )
            .map_err(|e| match e {
                AtlasError::SpriteSizeMismatch { expected, found, .. } => {
                    AtlasError::SpriteSizeMismatch {
                        path: current.display().to_string(),
                        expected,
                        found,
                    }
                }
                other => uv_write_failure(other),
            })?;
        if let Some(uv_map) = uv_map {
            uv_map.finish().map_err(uv_write_failure)?;
        }
        timer.record(&mut timings);

        let atlas_path = sequence.atlas_path();
        let timer = Timer::start("encode_atlas");
        let mut encoded = Vec::new();
        self.writer.write_tga(&packed.atlas, &mut encoded, &self.config)?;
        write_output(&atlas_path, &encoded)?;
        timer.record(&mut timings);

        info!(
            side = packed.layout.side,
            columns = packed.layout.grid.columns,
            rows = packed.layout.grid.rows,
            "Atlas complete in {:.3}ms",
            timings.total_duration().as_secs_f64() * 1000.0
        );

        Ok(AtlasSummary {
            sprite_count,
            layout: packed.layout,
            atlas_path,
            uv_map_path,
            timings,
        })
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AtlasConfig) {
        self.config = config;
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    let create_failure = |e: std::io::Error| AtlasError::OutputCreateFailure {
        path: path.display().to_string(),
        reason: e.to_string(),
    };
    let write_failure = |e: std::io::Error| AtlasError::OutputWriteFailure {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let mut file = File::create(path).map_err(create_failure)?;
    file.write_all(bytes).map_err(write_failure)?;
    file.flush().map_err(write_failure)?;
    Ok(())
}
