#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::io::Write;

    use crate::image_pipeline::atlas::{AtlasImage, UvMapWriter, UvRect, UV_MAP_VERSION};
    use crate::image_pipeline::common::error::{AtlasError, Result};
    use crate::image_pipeline::conversions::{PipelineTimings, SpriteAtlasPipeline};
    use crate::image_pipeline::sprite::{ImageTgaReader, SourceImage, SpriteReader};
    use crate::image_pipeline::tga::{AtlasConfig, StandardTgaWriter, TgaFormat, TgaWriter};

    /// Decodes a one-byte "file" into a sprite filled with that byte.
    struct MockReader {
        width: usize,
        height: usize,
        channels: usize,
        fail_on: Option<u8>,
        short_on: Option<u8>,
    }

    impl MockReader {
        fn new(width: usize, height: usize, channels: usize) -> Self {
            Self { width, height, channels, fail_on: None, short_on: None }
        }
    }

    impl SpriteReader for MockReader {
        fn read_sprite(&self, data: &[u8]) -> Result<SourceImage> {
            let seed = data[0];
            if self.fail_on == Some(seed) {
                return Err(AtlasError::DecodeError("Mock decode error".to_string()));
            }
            let height = if self.short_on == Some(seed) { self.height / 2 } else { self.height };
            SourceImage::new(
                self.width,
                height,
                self.channels,
                vec![seed; self.width * height * self.channels],
            )
        }
    }

    struct MockWriter {
        should_fail: bool,
        written_data: Arc<Mutex<Vec<AtlasImage>>>,
    }

    impl TgaWriter for MockWriter {
        fn write_tga(&self, image: &AtlasImage, output: &mut dyn Write, _config: &AtlasConfig) -> Result<()> {
            if self.should_fail {
                return Err(AtlasError::EncodeError("Mock encode error".to_string()));
            }
            self.written_data.lock().unwrap().push(image.clone());
            output.write_all(b"atlas")?;
            Ok(())
        }
    }

    fn mock_writer(should_fail: bool) -> (MockWriter, Arc<Mutex<Vec<AtlasImage>>>) {
        let written = Arc::new(Mutex::new(Vec::new()));
        (MockWriter { should_fail, written_data: written.clone() }, written)
    }

    fn write_seed_files(dir: &Path, base: &str, count: u8) {
        for i in 0..count {
            std::fs::write(dir.join(format!("{}{}.tga", base, i)), [i + 1]).unwrap();
        }
    }

    fn write_tga_sprites(dir: &Path, base: &str, sprites: &[SourceImage]) {
        let config = AtlasConfig::default();
        for (i, sprite) in sprites.iter().enumerate() {
            let image = AtlasImage {
                width: sprite.width,
                height: sprite.height,
                channels: sprite.channels,
                data: sprite.data.clone(),
            };
            let mut bytes = Vec::new();
            StandardTgaWriter.write_tga(&image, &mut bytes, &config).unwrap();
            std::fs::write(dir.join(format!("{}{}.tga", base, i)), bytes).unwrap();
        }
    }

    fn sprite(width: usize, height: usize, channels: usize, seed: usize) -> SourceImage {
        let data = (0..width * height * channels)
            .map(|i| ((i * 13 + seed * 41) % 253 + 1) as u8)
            .collect();
        SourceImage::new(width, height, channels, data).unwrap()
    }

    fn crop(atlas: &SourceImage, uv: &UvRect) -> Vec<u8> {
        let (x1, y1, x2, y2) = uv.to_pixels(atlas.width);
        let stride = atlas.row_bytes();
        let mut out = Vec::new();
        for row in (atlas.height - y2)..(atlas.height - y1) {
            let start = row * stride;
            out.extend_from_slice(&atlas.data[start + x1 * atlas.channels..start + x2 * atlas.channels]);
        }
        out
    }

    fn read_uv_map(path: &Path) -> (i32, i32, Vec<UvRect>) {
        let bytes = std::fs::read(path).unwrap();
        let word = |i: usize| -> [u8; 4] { bytes[i..i + 4].try_into().unwrap() };
        let rects = bytes[8..]
            .chunks_exact(16)
            .map(|r| UvRect {
                u1: f32::from_le_bytes(r[0..4].try_into().unwrap()),
                v1: f32::from_le_bytes(r[4..8].try_into().unwrap()),
                u2: f32::from_le_bytes(r[8..12].try_into().unwrap()),
                v2: f32::from_le_bytes(r[12..16].try_into().unwrap()),
            })
            .collect();
        (i32::from_le_bytes(word(0)), i32::from_le_bytes(word(4)), rects)
    }

    #[test]
    fn test_build_atlas_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let sprites: Vec<_> = (0..5).map(|i| sprite(8, 8, 4, i)).collect();
        write_tga_sprites(dir.path(), "walk", &sprites);

        let pipeline = SpriteAtlasPipeline::new(AtlasConfig::default());
        let summary = pipeline.build_atlas(dir.path().join("walk")).unwrap();

        assert_eq!(summary.sprite_count, 5);
        assert_eq!(summary.layout.side, 32);
        assert_eq!(summary.atlas_path, dir.path().join("walk.tga"));
        assert_eq!(summary.uv_map_path, Some(dir.path().join("walk.tga.ltc")));

        let atlas = ImageTgaReader
            .read_sprite(&std::fs::read(&summary.atlas_path).unwrap())
            .unwrap();
        assert_eq!(atlas.shape(), (32, 32, 4));

        let uv_map_path = summary.uv_map_path.unwrap();
        assert_eq!(std::fs::metadata(&uv_map_path).unwrap().len(), 8 + 16 * 5);
        let (version, count, rects) = read_uv_map(&uv_map_path);
        assert_eq!(version, UV_MAP_VERSION);
        assert_eq!(count, 5);
        assert_eq!(rects.len(), 5);

        for (sprite, uv) in sprites.iter().zip(&rects) {
            assert_eq!(crop(&atlas, uv), sprite.data);
        }
    }

    #[test]
    fn test_rle_atlas_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let sprites: Vec<_> = (0..3).map(|i| sprite(6, 4, 3, i)).collect();
        write_tga_sprites(dir.path(), "ship", &sprites);

        let config = AtlasConfig::builder().format(TgaFormat::from_code(6).unwrap()).build();
        let summary = SpriteAtlasPipeline::new(config).build_atlas(dir.path().join("ship")).unwrap();

        let atlas = ImageTgaReader
            .read_sprite(&std::fs::read(&summary.atlas_path).unwrap())
            .unwrap();
        let (_, _, rects) = read_uv_map(&dir.path().join("ship.tga.ltc"));
        for (sprite, uv) in sprites.iter().zip(&rects) {
            assert_eq!(crop(&atlas, uv), sprite.data);
        }
    }

    #[test]
    fn test_runs_are_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let sprites: Vec<_> = (0..6).map(|i| sprite(5, 7, 3, i)).collect();
        write_tga_sprites(dir.path(), "coin", &sprites);
        let pipeline = SpriteAtlasPipeline::new(AtlasConfig::default());

        pipeline.build_atlas(dir.path().join("coin")).unwrap();
        let first = (
            std::fs::read(dir.path().join("coin.tga")).unwrap(),
            std::fs::read(dir.path().join("coin.tga.ltc")).unwrap(),
        );
        pipeline.build_atlas(dir.path().join("coin")).unwrap();
        let second = (
            std::fs::read(dir.path().join("coin.tga")).unwrap(),
            std::fs::read(dir.path().join("coin.tga.ltc")).unwrap(),
        );

        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_sprites_create_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = SpriteAtlasPipeline::new(AtlasConfig::default());

        let result = pipeline.build_atlas(dir.path().join("ghost"));

        assert!(matches!(result, Err(AtlasError::NoSpritesFound(_))));
        assert!(!dir.path().join("ghost.tga").exists());
        assert!(!dir.path().join("ghost.tga.ltc").exists());
    }

    #[test]
    fn test_uv_map_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        write_seed_files(dir.path(), "tile", 3);
        let (writer, written) = mock_writer(false);
        let config = AtlasConfig::builder().emit_coordinates(false).build();

        let pipeline = SpriteAtlasPipeline::with_custom(MockReader::new(4, 4, 1), writer, config);
        let summary = pipeline.build_atlas(dir.path().join("tile")).unwrap();

        assert_eq!(summary.uv_map_path, None);
        assert!(!dir.path().join("tile.tga.ltc").exists());
        assert_eq!(std::fs::read(dir.path().join("tile.tga")).unwrap(), b"atlas");
        assert_eq!(written.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_mock_atlas_layout() {
        let dir = tempfile::tempdir().unwrap();
        write_seed_files(dir.path(), "tile", 5);
        let (writer, written) = mock_writer(false);

        let pipeline = SpriteAtlasPipeline::with_custom(
            MockReader::new(4, 4, 1),
            writer,
            AtlasConfig::default(),
        );
        pipeline.build_atlas(dir.path().join("tile")).unwrap();

        let written = written.lock().unwrap();
        let atlas = &written[0];
        assert_eq!((atlas.width, atlas.height, atlas.channels), (16, 16, 1));
        // seeds 1..=5 occupy 5 cells of 16 bytes, the remaining 11 cells stay empty
        for seed in 1..=5u8 {
            assert_eq!(atlas.data.iter().filter(|&&b| b == seed).count(), 16);
        }
        assert_eq!(atlas.data.iter().filter(|&&b| b == 0).count(), 11 * 16);
        // sprite 0 sits at the start of the last stored cell row
        assert_eq!(atlas.data[12 * 16], 1);
        assert_eq!(atlas.data[12 * 16 + 4], 2);
        assert_eq!(atlas.data[8 * 16], 5);
    }

    #[test]
    fn test_decode_failure_names_sprite() {
        let dir = tempfile::tempdir().unwrap();
        write_seed_files(dir.path(), "tile", 4);
        let (writer, written) = mock_writer(false);
        let reader = MockReader { fail_on: Some(3), ..MockReader::new(4, 4, 1) };

        let pipeline = SpriteAtlasPipeline::with_custom(reader, writer, AtlasConfig::default());
        let result = pipeline.build_atlas(dir.path().join("tile"));

        match result {
            Err(AtlasError::SpriteDecodeFailure { path, .. }) => assert!(path.ends_with("tile2.tga")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(written.lock().unwrap().is_empty());
        assert!(!dir.path().join("tile.tga").exists());
    }

    #[test]
    fn test_size_mismatch_names_sprite() {
        let dir = tempfile::tempdir().unwrap();
        write_seed_files(dir.path(), "tile", 4);
        let (writer, _) = mock_writer(false);
        let reader = MockReader { short_on: Some(4), ..MockReader::new(4, 4, 2) };

        let pipeline = SpriteAtlasPipeline::with_custom(reader, writer, AtlasConfig::default());
        let result = pipeline.build_atlas(dir.path().join("tile"));

        match result {
            Err(AtlasError::SpriteSizeMismatch { path, expected, found }) => {
                assert!(path.ends_with("tile3.tga"));
                assert_eq!(expected, (4, 4, 2));
                assert_eq!(found, (4, 2, 2));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!dir.path().join("tile.tga").exists());
    }

    #[test]
    fn test_writer_failure() {
        let dir = tempfile::tempdir().unwrap();
        write_seed_files(dir.path(), "tile", 2);
        let (writer, _) = mock_writer(true);

        let pipeline = SpriteAtlasPipeline::with_custom(
            MockReader::new(4, 4, 1),
            writer,
            AtlasConfig::default(),
        );
        let result = pipeline.build_atlas(dir.path().join("tile"));

        assert!(matches!(result, Err(AtlasError::EncodeError(_))));
        assert!(!dir.path().join("tile.tga").exists());
    }

    #[test]
    fn test_unwritable_outputs() {
        let dir = tempfile::tempdir().unwrap();
        write_seed_files(dir.path(), "tile", 2);
        std::fs::create_dir(dir.path().join("tile.tga.ltc")).unwrap();

        let (writer, _) = mock_writer(false);
        let pipeline = SpriteAtlasPipeline::with_custom(
            MockReader::new(4, 4, 1),
            writer,
            AtlasConfig::default(),
        );
        let result = pipeline.build_atlas(dir.path().join("tile"));
        assert!(matches!(result, Err(AtlasError::OutputCreateFailure { .. })));

        std::fs::create_dir(dir.path().join("tile.tga")).unwrap();
        let (writer, _) = mock_writer(false);
        let config = AtlasConfig::builder().emit_coordinates(false).build();
        let pipeline = SpriteAtlasPipeline::with_custom(MockReader::new(4, 4, 1), writer, config);
        let result = pipeline.build_atlas(dir.path().join("tile"));
        assert!(matches!(result, Err(AtlasError::OutputCreateFailure { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn test_failed_writes_name_the_output() {
        let full_device = Path::new("/dev/full");
        if !full_device.exists() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        write_seed_files(dir.path(), "tile", 2);

        std::os::unix::fs::symlink(full_device, dir.path().join("tile.tga.ltc")).unwrap();
        let (writer, _) = mock_writer(false);
        let pipeline = SpriteAtlasPipeline::with_custom(
            MockReader::new(4, 4, 1),
            writer,
            AtlasConfig::default(),
        );
        match pipeline.build_atlas(dir.path().join("tile")) {
            Err(AtlasError::OutputWriteFailure { path, .. }) => assert!(path.ends_with("tile.tga.ltc")),
            other => panic!("unexpected result: {:?}", other),
        }

        std::os::unix::fs::symlink(full_device, dir.path().join("tile.tga")).unwrap();
        let (writer, _) = mock_writer(false);
        let config = AtlasConfig::builder().emit_coordinates(false).build();
        let pipeline = SpriteAtlasPipeline::with_custom(MockReader::new(4, 4, 1), writer, config);
        let error = pipeline.build_atlas(dir.path().join("tile")).unwrap_err();

        assert!(matches!(error, AtlasError::OutputWriteFailure { .. }));
        assert!(error.to_string().contains("tile.tga - couldn't write"));
    }

    #[test]
    fn test_atlas_limit_is_enforced() {
        let dir = tempfile::tempdir().unwrap();
        write_seed_files(dir.path(), "tile", 5);
        let (writer, _) = mock_writer(false);
        let config = AtlasConfig::builder().max_side(Some(8)).build();

        let pipeline = SpriteAtlasPipeline::with_custom(MockReader::new(4, 4, 1), writer, config);
        let result = pipeline.build_atlas(dir.path().join("tile"));

        assert!(matches!(result, Err(AtlasError::AtlasTooLarge { side: 16, max: 8 })));
    }

    #[test]
    fn test_pack_in_memory_streams_uv_records() {
        let sprites: Vec<_> = (0..5).map(|i| sprite(64, 64, 4, i)).collect();
        let pipeline = SpriteAtlasPipeline::new(AtlasConfig::default());

        let mut buffer = Vec::new();
        let packed = {
            let mut uv_map = UvMapWriter::new(&mut buffer, sprites.len()).unwrap();
            let packed = pipeline
                .pack(sprites.len(), |i| Ok(sprites[i].clone()), Some(&mut uv_map))
                .unwrap();
            uv_map.finish().unwrap();
            packed
        };

        assert_eq!(packed.layout.side, 256);
        assert_eq!((packed.layout.grid.columns, packed.layout.grid.rows), (4, 4));
        assert_eq!(packed.uvs.len(), 5);
        assert_eq!(packed.uvs[4], UvRect { u1: 0.0, v1: 0.25, u2: 0.25, v2: 0.5 });
        assert_eq!(buffer.len(), 8 + 16 * 5);
        assert_eq!(&buffer[8 + 16 * 4..], &packed.uvs[4].to_le_bytes());
    }

    #[test]
    fn test_pack_loads_each_sprite_once() {
        let sprites: Vec<_> = (0..4).map(|i| sprite(3, 3, 1, i)).collect();
        let pipeline = SpriteAtlasPipeline::new(AtlasConfig::default());
        let mut loads = Vec::new();

        pipeline
            .pack(sprites.len(), |i| {
                loads.push(i);
                Ok(sprites[i].clone())
            }, None)
            .unwrap();

        assert_eq!(loads, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_pack_without_sprites() {
        let pipeline = SpriteAtlasPipeline::new(AtlasConfig::default());
        let result = pipeline.pack(0, |_| unreachable!(), None);

        assert!(matches!(result, Err(AtlasError::NoSpritesFound(_))));
    }

    #[test]
    fn test_timings_cover_each_step() {
        let dir = tempfile::tempdir().unwrap();
        write_seed_files(dir.path(), "tile", 2);
        let (writer, _) = mock_writer(false);

        let pipeline = SpriteAtlasPipeline::with_custom(
            MockReader::new(2, 2, 1),
            writer,
            AtlasConfig::default(),
        );
        let summary = pipeline.build_atlas(dir.path().join("tile")).unwrap();

        let names: Vec<_> = summary.timings.steps().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["discover_sprites", "create_uv_map", "pack_sprites", "encode_atlas"]);
        assert!(summary.timings.get_step("pack_sprites").is_some());
        assert!(summary.timings.get_step("decode_sprites").is_none());
    }

    #[test]
    fn test_timing_summary_lines() {
        let mut timings = PipelineTimings::new();
        timings.add_step("pack_sprites", std::time::Duration::from_millis(3));
        timings.add_step("pack_sprites", std::time::Duration::from_millis(1));

        assert_eq!(timings.get_step("pack_sprites"), Some(std::time::Duration::from_millis(4)));
        let lines = timings.summary_lines();
        assert_eq!(lines.len(), 6);
        assert!(lines[5].starts_with("Total"));
    }
}
