//! Sample data types

use std::fmt;

use crate::errors::{TileError, TileResult};
use crate::tiff::constants::sample_format;

/// Numeric type of one raster element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl DType {
    /// Size of one element in bytes
    pub fn itemsize(&self) -> usize {
        match self {
            DType::U8 | DType::I8 => 1,
            DType::U16 | DType::I16 => 2,
            DType::U32 | DType::I32 | DType::F32 => 4,
            DType::U64 | DType::I64 | DType::F64 => 8,
        }
    }

    /// Maps TIFF BitsPerSample and SampleFormat values to a dtype
    pub fn from_tiff(bits: u64, format: u64) -> TileResult<Self> {
        let dtype = match (format, bits) {
            (sample_format::UINT, 8) => DType::U8,
            (sample_format::UINT, 16) => DType::U16,
            (sample_format::UINT, 32) => DType::U32,
            (sample_format::UINT, 64) => DType::U64,
            (sample_format::INT, 8) => DType::I8,
            (sample_format::INT, 16) => DType::I16,
            (sample_format::INT, 32) => DType::I32,
            (sample_format::INT, 64) => DType::I64,
            (sample_format::IEEE_FP, 32) => DType::F32,
            (sample_format::IEEE_FP, 64) => DType::F64,
            _ => return Err(TileError::UnsupportedSampleFormat { bits, format }),
        };
        Ok(dtype)
    }

    /// Short numpy-style name ("uint16", "float32", ...)
    pub fn name(&self) -> &'static str {
        match self {
            DType::U8 => "uint8",
            DType::U16 => "uint16",
            DType::U32 => "uint32",
            DType::U64 => "uint64",
            DType::I8 => "int8",
            DType::I16 => "int16",
            DType::I32 => "int32",
            DType::I64 => "int64",
            DType::F32 => "float32",
            DType::F64 => "float64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
