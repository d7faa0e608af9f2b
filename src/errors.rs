//! Custom error types for raster tiling

use std::fmt;
use std::io;

/// Error types for TIFF parsing, tiling and normalization
#[derive(Debug)]
pub enum TileError {
    /// I/O error
    IoError(io::Error),
    /// Invalid byte order marker
    InvalidByteOrder(u16),
    /// Invalid BigTIFF header
    InvalidBigTIFFHeader,
    /// Unsupported TIFF version
    UnsupportedVersion(u16),
    /// Tag not found
    TagNotFound(u16),
    /// Unsupported field type
    UnsupportedFieldType(u16),
    /// Unsupported bits-per-sample / sample-format combination
    UnsupportedSampleFormat { bits: u64, format: u64 },
    /// Pixel data that cannot be addressed through a flat memory map
    UnsupportedLayout(String),
    /// File type that is not a TIFF
    UnsupportedFormat(String),
    /// Invalid parameter combination
    ConfigurationError(String),
    /// Tile index outside the grid
    IndexError(String),
    /// Quantile bounds that cannot rescale data
    NormalizationError(String),
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for TileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileError::IoError(e) => write!(f, "I/O error: {}", e),
            TileError::InvalidByteOrder(v) => write!(f, "Invalid byte order marker: {:#06x}", v),
            TileError::InvalidBigTIFFHeader => write!(f, "Invalid BigTIFF header"),
            TileError::UnsupportedVersion(v) => write!(f, "Unsupported TIFF version: {}", v),
            TileError::TagNotFound(tag) => write!(f, "Tag not found: {}", tag),
            TileError::UnsupportedFieldType(ft) => write!(f, "Unsupported field type: {}", ft),
            TileError::UnsupportedSampleFormat { bits, format } => {
                write!(f, "Unsupported sample format: {} bits, format {}", bits, format)
            }
            TileError::UnsupportedLayout(msg) => write!(f, "Unsupported data layout: {}", msg),
            TileError::UnsupportedFormat(msg) => write!(f, "Unsupported file format: {}", msg),
            TileError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            TileError::IndexError(msg) => write!(f, "Index error: {}", msg),
            TileError::NormalizationError(msg) => write!(f, "Normalization error: {}", msg),
            TileError::GenericError(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for TileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TileError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TileError {
    fn from(error: io::Error) -> Self {
        TileError::IoError(error)
    }
}

impl From<String> for TileError {
    fn from(msg: String) -> Self {
        TileError::GenericError(msg)
    }
}

/// Result type for tiling operations
pub type TileResult<T> = Result<T, TileError>;
