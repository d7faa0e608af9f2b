//! TIFF validation utilities
//!
//! Checks that keep the parser from wandering off the end of a
//! truncated or malformed file.

use log::{debug, error, warn};
use std::io::SeekFrom;

use crate::errors::{TileError, TileResult};
use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::header;

/// Validates an IFD offset to ensure it's within the file
pub fn validate_ifd_offset(offset: u64, file_size: u64) -> TileResult<()> {
    if offset >= file_size || offset < 8 {
        return Err(TileError::GenericError(format!(
            "Invalid IFD offset: {} (file size: {})",
            offset, file_size
        )));
    }

    Ok(())
}

/// Gets the stream size, restoring the current position
///
/// Returns u64::MAX when the size cannot be determined.
pub fn get_file_size(reader: &mut dyn SeekableReader) -> TileResult<u64> {
    let current_position = reader.stream_position()?;
    let file_size = match reader.seek(SeekFrom::End(0)) {
        Ok(size) => size,
        Err(e) => {
            warn!("Could not determine file size: {}", e);
            u64::MAX
        }
    };
    reader.seek(SeekFrom::Start(current_position))?;

    Ok(file_size)
}

/// Validates the BigTIFF header
///
/// After the version number (43) BigTIFF stores the offset size, which
/// must be 8, followed by a reserved zero.
pub fn validate_bigtiff_header(
    reader: &mut dyn SeekableReader,
    byte_order_handler: &dyn ByteOrderHandler,
) -> TileResult<()> {
    let offset_size = byte_order_handler.read_u16(reader)?;
    let zeros = byte_order_handler.read_u16(reader)?;

    debug!("BigTIFF offset size: {}, reserved: {}", offset_size, zeros);

    if offset_size != header::BIGTIFF_OFFSET_SIZE || zeros != 0 {
        error!("Invalid BigTIFF header: offset_size={}, zeros={}", offset_size, zeros);
        return Err(TileError::InvalidBigTIFFHeader);
    }

    Ok(())
}

/// Validates that a byte range lies inside a file of `file_size` bytes
pub fn validate_byte_range(offset: u64, len: u64, file_size: u64, what: &str) -> TileResult<()> {
    match offset.checked_add(len) {
        Some(end) if end <= file_size => Ok(()),
        _ => Err(TileError::UnsupportedLayout(format!(
            "{} at offset {} with {} bytes exceeds file size {}",
            what, offset, len, file_size
        ))),
    }
}
