//! Integration tests: tiling real TIFF files through the memory map

mod common;

use common::{ramp, Samples, TestRaster};
use ndarray::s;
use tiletiff::{
    MappedRaster, QuantileBounds, RasterSource, RegionBox, TileConfig, TileError, TileIndex, TiledRaster,
};

/// 100x100 RGB page, exposed as a (1, 100, 100, 3) volume
fn rgb_raster() -> TestRaster {
    let mut raster = TestRaster::new(1, 100, 100, 3);
    raster.description = Some(r#"{"shape": [1, 100, 100, 3]}"#.to_string());
    raster
}

fn example_config() -> TileConfig {
    TileConfig::default()
        .with_tile_axes(&[1, 2])
        .with_channel_axis(Some(3))
        .with_pixel_max(2500)
}

#[test]
fn test_four_tiles_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let raster = rgb_raster();
    let path = raster.write(dir.path(), "rgb.tif", &ramp(raster.len()));

    let tiled = TiledRaster::open(&path, example_config()).unwrap();

    assert_eq!(tiled.shape(), &[1, 100, 100, 3]);
    assert_eq!(tiled.len(), 4);
    let offsets: Vec<_> = tiled.offsets().collect();
    assert_eq!(offsets, vec![
        vec![0, 0, 0, 0],
        vec![0, 0, 50, 0],
        vec![0, 50, 0, 0],
        vec![0, 50, 50, 0],
    ]);
    for tile in tiled.tiles() {
        assert_eq!(tile.shape(), vec![1, 50, 50, 3]);
    }
}

#[test]
fn test_overlapping_tiles_are_clipped_at_edges() {
    let dir = tempfile::tempdir().unwrap();
    let raster = rgb_raster();
    let path = raster.write(dir.path(), "rgb.tiff", &vec![7.0; raster.len()]);

    // constant data has degenerate bounds; only normalizing fails
    let tiled = TiledRaster::open(&path, example_config().with_overlap(0.5)).unwrap();

    assert_eq!(tiled.len(), 16);
    assert_eq!(tiled.split_factor(), 4);
    for (tile, offset) in tiled.split() {
        let expected: Vec<usize> = offset.iter().zip(tiled.shape())
            .map(|(&start, &n)| if n == 100 { (n - start).min(50) } else { n })
            .collect();
        assert_eq!(tile.shape(), expected);
    }
    assert!(matches!(
        tiled.normalize(tiled.get_tile(0usize).unwrap().read().unwrap(), false),
        Err(TileError::NormalizationError(_))
    ));
}

#[test]
fn test_full_overlap_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let raster = TestRaster::new(1, 10, 10, 1);
    let path = raster.write(dir.path(), "gray.tif", &ramp(raster.len()));

    let result = TiledRaster::open(&path, TileConfig::default().with_overlap(1.0));
    assert!(matches!(result, Err(TileError::ConfigurationError(_))));
}

#[test]
fn test_tiles_read_file_contents() {
    let dir = tempfile::tempdir().unwrap();
    let raster = TestRaster::new(3, 20, 30, 1);
    let values = ramp(raster.len());
    let path = raster.write(dir.path(), "stack.tif", &values);

    let tiled = TiledRaster::open(&path, TileConfig::default().with_pixel_max(100)).unwrap();
    let full = tiled.source().read_region(&RegionBox::full(tiled.shape())).unwrap();
    assert_eq!(full.shape(), &[3, 20, 30]);

    for (tile, offset) in tiled.split() {
        let data = tile.read().unwrap();
        let (y, x) = (offset[1], offset[2]);
        let shape = tile.shape();
        let expected = full.slice(s![.., y..y + shape[1], x..x + shape[2]]);
        assert_eq!(data, expected.into_dyn());
    }
}

#[test]
fn test_big_endian_float_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut raster = TestRaster::new(1, 8, 8, 1);
    raster.sample_type = Samples::F32;
    raster.big_endian = true;
    let values: Vec<f64> = ramp(raster.len()).iter().map(|v| v * 0.5 - 3.0).collect();
    let path = raster.write(dir.path(), "float.tif", &values);

    let source = MappedRaster::open(&path).unwrap();
    assert_eq!(source.dtype(), tiletiff::DType::F32);

    let data = source.read_region(&RegionBox::full(&[8, 8])).unwrap();
    assert_eq!(data[[0, 0]], -3.0);
    assert_eq!(data[[7, 7]], 63.0 * 0.5 - 3.0);
}

#[test]
fn test_description_shape_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let mut raster = TestRaster::new(1, 12, 10, 1);
    raster.description = Some(r#"{"shape": [2, 6, 10]}"#.to_string());
    let path = raster.write(dir.path(), "volume.tif", &ramp(raster.len()));

    let tiled = TiledRaster::open(&path, TileConfig::default().with_tile_axes(&[0, 2])).unwrap();
    assert_eq!(tiled.shape(), &[2, 6, 10]);
    assert_eq!(tiled.resolved().tile_axes, vec![0, 2]);
}

#[test]
fn test_per_channel_normalization() {
    let dir = tempfile::tempdir().unwrap();
    let raster = TestRaster::new(1, 10, 10, 2);
    // channel 0 holds 0..100, channel 1 holds 1000..1100
    let values: Vec<f64> = (0..100).flat_map(|i| [i as f64, 1000.0 + i as f64]).collect();
    let path = raster.write(dir.path(), "two.tif", &values);

    let config = TileConfig::default()
        .with_tile_axes(&[0, 1])
        .with_channel_axis(Some(-1))
        .with_pixel_max(25)
        .with_scale_quantile(0.0);
    let tiled = TiledRaster::open(&path, config).unwrap();

    let QuantileBounds::PerChannel { axis, bounds } = tiled.bounds() else {
        panic!("expected per-channel bounds");
    };
    assert_eq!(*axis, 2);
    assert_eq!(bounds.len(), 2);
    assert!(bounds[0].1 < bounds[1].0);

    for tile in tiled.tiles() {
        let data = tiled.normalize(tile.read().unwrap(), true).unwrap();
        assert!(data.iter().all(|v| (0.0..=1.0).contains(v)));
    }
}

#[test]
fn test_update_is_all_or_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let raster = rgb_raster();
    let path = raster.write(dir.path(), "rgb.tif", &ramp(raster.len()));
    let mut tiled = TiledRaster::open(&path, example_config()).unwrap();
    let bounds = tiled.bounds().clone();

    tiled.config_mut().tile_axes = vec![1, 3];
    assert!(matches!(tiled.update(), Err(TileError::ConfigurationError(_))));
    assert_eq!(tiled.len(), 4);
    assert_eq!(tiled.bounds(), &bounds);

    tiled.config_mut().tile_axes = vec![1, 2];
    tiled.config_mut().overlap = 0.5;
    tiled.update().unwrap();
    assert_eq!(tiled.len(), 16);
}

#[test]
fn test_index_errors() {
    let dir = tempfile::tempdir().unwrap();
    let raster = rgb_raster();
    let path = raster.write(dir.path(), "rgb.tif", &ramp(raster.len()));
    let tiled = TiledRaster::open(&path, example_config()).unwrap();

    assert!(matches!(tiled.get_tile(TileIndex::Flat(4)), Err(TileError::IndexError(_))));
    assert!(matches!(tiled.get_offset(vec![0usize, 2]), Err(TileError::IndexError(_))));
    assert!(matches!(tiled.get_box(vec![0usize]), Err(TileError::IndexError(_))));
    assert_eq!(tiled.get_offset(vec![1usize, 0]).unwrap(), vec![0, 50, 0, 0]);
}

#[test]
fn test_unmappable_files_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut raster = TestRaster::new(1, 10, 10, 1);
    raster.compression = 8;
    let path = raster.write(dir.path(), "deflate.tif", &ramp(raster.len()));

    assert!(matches!(MappedRaster::open(&path), Err(TileError::UnsupportedLayout(_))));

    let path = TestRaster::new(1, 10, 10, 1).write(dir.path(), "gray.png", &ramp(100));
    assert!(matches!(MappedRaster::open(&path), Err(TileError::UnsupportedFormat(_))));
}
