//! Tests for the TIFF structure reader

use super::test_utils::{create_test_big_endian_buffer, create_test_bigtiff_buffer, create_test_tiff_buffer};
use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::tags;
use crate::tiff::reader::TiffReader;

#[test]
fn test_read_classic_tiff() {
    let mut cursor = create_test_tiff_buffer();
    let mut reader = TiffReader::new();

    let tiff = reader.read(&mut cursor).unwrap();
    assert!(!tiff.is_big_tiff);
    assert_eq!(tiff.byte_order, ByteOrder::LittleEndian);
    assert_eq!(tiff.ifds.len(), 1);
    assert_eq!(tiff.ifds[0].get_dimensions(), Some((800, 600)));
}

#[test]
fn test_inline_short_array_is_decoded() {
    let mut cursor = create_test_tiff_buffer();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    let bits = reader.read_tag_values(&mut cursor, &tiff.ifds[0], tags::BITS_PER_SAMPLE).unwrap();
    assert_eq!(bits, vec![16, 16]);
}

#[test]
fn test_big_endian_inline_short() {
    let mut cursor = create_test_big_endian_buffer();
    let mut reader = TiffReader::new();

    let tiff = reader.read(&mut cursor).unwrap();
    assert_eq!(tiff.byte_order, ByteOrder::BigEndian);
    assert_eq!(tiff.ifds[0].get_dimensions(), Some((320, 240)));
}

#[test]
fn test_read_bigtiff() {
    let mut cursor = create_test_bigtiff_buffer();
    let mut reader = TiffReader::new();

    let tiff = reader.read(&mut cursor).unwrap();
    assert!(tiff.is_big_tiff);
    assert!(reader.is_big_tiff());
    assert_eq!(tiff.ifds[0].get_dimensions(), Some((1024, 768)));
}

#[test]
fn test_missing_tag_is_reported() {
    let mut cursor = create_test_tiff_buffer();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    let result = reader.read_tag_values(&mut cursor, &tiff.ifds[0], tags::STRIP_OFFSETS);
    assert!(matches!(result, Err(crate::errors::TileError::TagNotFound(273))));
}

#[test]
fn test_oversized_tag_count_is_rejected() {
    use byteorder::{LittleEndian, WriteBytesExt};

    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();

    // StripOffsets claiming four billion LONGs at offset 8
    buffer.write_u16::<LittleEndian>(1).unwrap();
    buffer.write_u16::<LittleEndian>(tags::STRIP_OFFSETS).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();
    buffer.write_u32::<LittleEndian>(u32::MAX).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();
    buffer.write_u32::<LittleEndian>(0).unwrap();

    let mut cursor = std::io::Cursor::new(buffer);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    let result = reader.read_tag_values(&mut cursor, &tiff.ifds[0], tags::STRIP_OFFSETS);
    assert!(matches!(result, Err(crate::errors::TileError::UnsupportedLayout(_))));
}
