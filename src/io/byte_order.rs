//! Byte order handling for TIFF files
//!
//! This module implements the Strategy pattern for handling different
//! byte orders (little-endian vs big-endian), both when reading TIFF
//! structures from a stream and when decoding mapped sample bytes.

use byteorder::{BigEndian, ByteOrder as ByteOrderExt, LittleEndian, ReadBytesExt};
use std::io::Result;

use crate::errors::{TileError, TileResult};
use crate::io::seekable::SeekableReader;
use crate::raster::dtype::DType;

/// Represents the byte order of a TIFF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (II)
    LittleEndian,
    /// Big-endian byte order (MM)
    BigEndian,
}

impl ByteOrder {
    /// Detects the byte order from the TIFF header
    pub fn detect(reader: &mut dyn SeekableReader) -> TileResult<Self> {
        let byte_order = reader.read_u16::<LittleEndian>()?;
        match byte_order {
            0x4949 => Ok(ByteOrder::LittleEndian), // "II" (Intel)
            0x4D4D => Ok(ByteOrder::BigEndian),    // "MM" (Motorola)
            _ => Err(TileError::InvalidByteOrder(byte_order)),
        }
    }

    /// Returns a string representation of this byte order
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// Creates the appropriate handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }
}

/// Trait for byte order handling strategies
pub trait ByteOrderHandler: Send + Sync {
    /// Read a u16 value
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16>;

    /// Read a u32 value
    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32>;

    /// Read a u64 value
    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64>;

    /// Decode packed samples of `dtype` from `bytes`, appending them to `out`
    ///
    /// Trailing bytes that do not form a whole sample are ignored.
    fn decode_samples(&self, bytes: &[u8], dtype: DType, out: &mut Vec<f64>);
}

/// Decodes a run of packed samples with a fixed byte order
fn decode_with<B: ByteOrderExt>(bytes: &[u8], dtype: DType, out: &mut Vec<f64>) {
    let size = dtype.itemsize();
    out.reserve(bytes.len() / size);

    for chunk in bytes.chunks_exact(size) {
        let value = match dtype {
            DType::U8 => chunk[0] as f64,
            DType::I8 => chunk[0] as i8 as f64,
            DType::U16 => B::read_u16(chunk) as f64,
            DType::I16 => B::read_i16(chunk) as f64,
            DType::U32 => B::read_u32(chunk) as f64,
            DType::I32 => B::read_i32(chunk) as f64,
            DType::U64 => B::read_u64(chunk) as f64,
            DType::I64 => B::read_i64(chunk) as f64,
            DType::F32 => B::read_f32(chunk) as f64,
            DType::F64 => B::read_f64(chunk),
        };
        out.push(value);
    }
}

/// Little-endian byte order handler
pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<LittleEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<LittleEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<LittleEndian>()
    }

    fn decode_samples(&self, bytes: &[u8], dtype: DType, out: &mut Vec<f64>) {
        decode_with::<LittleEndian>(bytes, dtype, out)
    }
}

/// Big-endian byte order handler
pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<BigEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<BigEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<BigEndian>()
    }

    fn decode_samples(&self, bytes: &[u8], dtype: DType, out: &mut Vec<f64>) {
        decode_with::<BigEndian>(bytes, dtype, out)
    }
}
