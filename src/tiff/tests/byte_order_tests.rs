//! Tests for the byte order module

use std::io::Cursor;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
use crate::raster::dtype::DType;

#[test]
fn test_byte_order_detection_little_endian() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II
    let mut cursor = Cursor::new(buffer);

    assert_eq!(ByteOrder::detect(&mut cursor).unwrap(), ByteOrder::LittleEndian);
}

#[test]
fn test_byte_order_detection_big_endian() {
    let mut buffer = Vec::new();
    buffer.write_u16::<BigEndian>(0x4D4D).unwrap(); // MM
    let mut cursor = Cursor::new(buffer);

    assert_eq!(ByteOrder::detect(&mut cursor).unwrap(), ByteOrder::BigEndian);
}

#[test]
fn test_byte_order_detection_invalid() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x1234).unwrap();
    let mut cursor = Cursor::new(buffer);

    assert!(ByteOrder::detect(&mut cursor).is_err());
}

#[test]
fn test_little_endian_handler() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x1234).unwrap();
    buffer.write_u32::<LittleEndian>(0x12345678).unwrap();
    buffer.write_u64::<LittleEndian>(0x1234567890ABCDEF).unwrap();
    let mut cursor = Cursor::new(buffer);

    let handler = LittleEndianHandler;

    assert_eq!(handler.read_u16(&mut cursor).unwrap(), 0x1234);
    assert_eq!(handler.read_u32(&mut cursor).unwrap(), 0x12345678);
    assert_eq!(handler.read_u64(&mut cursor).unwrap(), 0x1234567890ABCDEF);
}

#[test]
fn test_big_endian_handler() {
    let mut buffer = Vec::new();
    buffer.write_u16::<BigEndian>(0x1234).unwrap();
    buffer.write_u32::<BigEndian>(0x12345678).unwrap();
    buffer.write_u64::<BigEndian>(0x1234567890ABCDEF).unwrap();
    let mut cursor = Cursor::new(buffer);

    let handler = BigEndianHandler;

    assert_eq!(handler.read_u16(&mut cursor).unwrap(), 0x1234);
    assert_eq!(handler.read_u32(&mut cursor).unwrap(), 0x12345678);
    assert_eq!(handler.read_u64(&mut cursor).unwrap(), 0x1234567890ABCDEF);
}

#[test]
fn test_decode_samples_respects_byte_order() {
    let mut le = Vec::new();
    le.write_u16::<LittleEndian>(513).unwrap();
    le.write_i16::<LittleEndian>(-7).unwrap();
    let mut be = Vec::new();
    be.write_u16::<BigEndian>(513).unwrap();
    be.write_i16::<BigEndian>(-7).unwrap();

    let mut out = Vec::new();
    LittleEndianHandler.decode_samples(&le[..2], DType::U16, &mut out);
    LittleEndianHandler.decode_samples(&le[2..], DType::I16, &mut out);
    BigEndianHandler.decode_samples(&be[..2], DType::U16, &mut out);
    BigEndianHandler.decode_samples(&be[2..], DType::I16, &mut out);

    assert_eq!(out, vec![513.0, -7.0, 513.0, -7.0]);
}

#[test]
fn test_decode_samples_floats() {
    let mut buffer = Vec::new();
    buffer.write_f32::<BigEndian>(1.5).unwrap();
    buffer.write_f32::<BigEndian>(-0.25).unwrap();

    let mut out = Vec::new();
    BigEndianHandler.decode_samples(&buffer, DType::F32, &mut out);

    assert_eq!(out, vec![1.5, -0.25]);
}
