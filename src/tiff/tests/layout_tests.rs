//! Tests for raster layout discovery

use std::io::Cursor;

use super::test_utils::{create_padded_raster_tiff, create_raster_tiff, create_test_tiff_buffer};
use crate::errors::TileError;
use crate::raster::dtype::DType;
use crate::tiff::layout::RasterLayout;
use crate::tiff::reader::TiffReader;

fn discover(bytes: Vec<u8>) -> Result<RasterLayout, TileError> {
    let mut cursor = Cursor::new(bytes);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor)?;
    RasterLayout::discover(&tiff, &reader, &mut cursor)
}

#[test]
fn test_single_page_layout() {
    let values: Vec<u16> = (0..12).collect();
    let layout = discover(create_raster_tiff(1, 3, 4, 1, &values, None)).unwrap();

    assert_eq!(layout.shape, vec![3, 4]);
    assert_eq!(layout.dtype, DType::U16);
    assert_eq!(layout.data_offset, 8);
    assert_eq!(layout.nbytes, 24);
}

#[test]
fn test_pages_stack_into_leading_axis() {
    let values: Vec<u16> = (0..2 * 3 * 4 * 3).collect();
    let layout = discover(create_raster_tiff(2, 3, 4, 3, &values, None)).unwrap();

    assert_eq!(layout.shape, vec![2, 3, 4, 3]);
    assert_eq!(layout.len(), 72);
}

#[test]
fn test_description_shape_wins() {
    let values: Vec<u16> = (0..24).collect();
    let bytes = create_raster_tiff(1, 6, 4, 1, &values, Some(r#"{"shape": [2, 3, 4]}"#));

    assert_eq!(discover(bytes).unwrap().shape, vec![2, 3, 4]);
}

#[test]
fn test_mismatched_description_is_ignored() {
    let values: Vec<u16> = (0..24).collect();
    let bytes = create_raster_tiff(1, 6, 4, 1, &values, Some(r#"{"shape": [5, 5]}"#));

    assert_eq!(discover(bytes).unwrap().shape, vec![6, 4]);
}

#[test]
fn test_missing_strips_are_rejected() {
    // Header and IFD only, no StripOffsets
    let cursor = create_test_tiff_buffer();
    assert!(discover(cursor.into_inner()).is_err());
}

#[test]
fn test_truncated_pixel_data_is_rejected() {
    let values: Vec<u16> = (0..12).collect();
    let mut bytes = create_raster_tiff(1, 3, 4, 1, &values, None);
    // Claim a taller page than the strip holds
    let ifd = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    let height_value = ifd + 2 + 12 + 8;
    bytes[height_value..height_value + 4].copy_from_slice(&30u32.to_le_bytes());

    assert!(matches!(discover(bytes), Err(TileError::UnsupportedLayout(_))));
}

#[test]
fn test_padded_strip_before_later_pages_is_rejected() {
    let values: Vec<u16> = (0..8).collect();
    let bytes = create_padded_raster_tiff(2, 2, 2, 1, &values, None, 2);

    assert!(matches!(discover(bytes), Err(TileError::UnsupportedLayout(_))));
}

#[test]
fn test_padding_after_last_strip_is_allowed() {
    let values: Vec<u16> = (0..8).collect();
    let layout = discover(create_padded_raster_tiff(2, 2, 2, 1, &values, None, 0)).unwrap();
    assert_eq!(layout.nbytes, 16);

    let values: Vec<u16> = (0..4).collect();
    let layout = discover(create_padded_raster_tiff(1, 2, 2, 1, &values, None, 6)).unwrap();
    assert_eq!(layout.shape, vec![2, 2]);
    assert_eq!(layout.nbytes, 8);
}
