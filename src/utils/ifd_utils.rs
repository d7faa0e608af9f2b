//! IFD utilities
//!
//! Offsets and sizes of Image File Directories in TIFF files.

use log::debug;

use crate::errors::TileResult;
use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::ifd::IFD;

/// Reads an IFD offset (first or next), sized for the file flavour
///
/// A next offset of 0 means there are no more IFDs.
pub fn read_ifd_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler,
) -> TileResult<u64> {
    let offset = if is_big_tiff {
        byte_order_handler.read_u64(reader)?
    } else {
        byte_order_handler.read_u32(reader)? as u64
    };
    debug!("Read IFD offset: {}", offset);
    Ok(offset)
}

/// Calculates the size of an IFD in bytes, up to and including the
/// next-IFD offset field
pub fn calculate_ifd_size(ifd: &IFD, is_big_tiff: bool) -> u64 {
    if is_big_tiff {
        // 8 (entry count) + 20 (each entry) + 8 (next IFD offset)
        8 + (20 * ifd.entries.len() as u64) + 8
    } else {
        // 2 (entry count) + 12 (each entry) + 4 (next IFD offset)
        2 + (12 * ifd.entries.len() as u64) + 4
    }
}

/// Position of the next-IFD offset field of an IFD
pub fn next_offset_position(ifd: &IFD, is_big_tiff: bool) -> u64 {
    let field = if is_big_tiff { 8 } else { 4 };
    ifd.offset + calculate_ifd_size(ifd, is_big_tiff) - field
}
