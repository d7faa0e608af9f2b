//! TIFF file format parsing module
//!
//! Reads the header and IFD chain of TIFF and BigTIFF files and works out
//! where their pixel array lives, so it can be memory-mapped.

pub mod ifd;
pub(crate) mod types;
pub mod reader;
pub mod layout;
pub(crate) mod constants;
pub(crate) mod validation;

#[cfg(test)]
pub(crate) mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use ifd::{IFD, IFDEntry};
pub use layout::RasterLayout;
pub use reader::TiffReader;
pub use types::TIFF;
