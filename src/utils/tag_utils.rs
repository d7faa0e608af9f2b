//! TIFF tag utilities
//!
//! Utilities for reading TIFF tag values and naming tags in log output.

use std::io::Cursor;
use byteorder::ReadBytesExt;

use crate::errors::{TileError, TileResult};
use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{field_types, tags};

/// Reads `count` integer tag values of `field_type`, appending them to `values`
///
/// Rational values are packed as `numerator << 32 | denominator`.
pub fn read_tag_value_array(
    reader: &mut dyn SeekableReader,
    field_type: u16,
    count: u64,
    handler: &dyn ByteOrderHandler,
    values: &mut Vec<u64>,
) -> TileResult<()> {
    for _ in 0..count {
        let value = match field_type {
            field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED | field_types::ASCII => {
                reader.read_u8()? as u64
            }
            field_types::SHORT | field_types::SSHORT => handler.read_u16(reader)? as u64,
            field_types::LONG | field_types::SLONG | field_types::FLOAT => handler.read_u32(reader)? as u64,
            field_types::RATIONAL | field_types::SRATIONAL => {
                let num = handler.read_u32(reader)? as u64;
                let den = handler.read_u32(reader)? as u64;
                (num << 32) | den
            }
            field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 | field_types::DOUBLE => {
                handler.read_u64(reader)?
            }
            _ => return Err(TileError::UnsupportedFieldType(field_type)),
        };

        values.push(value);
    }

    Ok(())
}

/// Decodes values stored inside the value field of an IFD entry
///
/// # Arguments
/// * `raw` - The 4 (TIFF) or 8 (BigTIFF) raw bytes of the value field
/// * `field_type` - Field type of the entry
/// * `count` - Number of values
/// * `handler` - The byte order handler
pub fn decode_inline_values(
    raw: &[u8],
    field_type: u16,
    count: u64,
    handler: &dyn ByteOrderHandler,
) -> TileResult<Vec<u64>> {
    let mut cursor = Cursor::new(raw.to_vec());
    let mut values = Vec::with_capacity(count.min(raw.len() as u64) as usize);
    read_tag_value_array(&mut cursor, field_type, count, handler, &mut values)?;
    Ok(values)
}

/// Get the name of a TIFF tag, or "Unknown"
pub fn get_tag_name(tag: u16) -> &'static str {
    match tag {
        tags::NEW_SUBFILE_TYPE => "NewSubfileType",
        tags::IMAGE_WIDTH => "ImageWidth",
        tags::IMAGE_LENGTH => "ImageLength",
        tags::BITS_PER_SAMPLE => "BitsPerSample",
        tags::COMPRESSION => "Compression",
        tags::PHOTOMETRIC_INTERPRETATION => "PhotometricInterpretation",
        tags::IMAGE_DESCRIPTION => "ImageDescription",
        tags::STRIP_OFFSETS => "StripOffsets",
        tags::SAMPLES_PER_PIXEL => "SamplesPerPixel",
        tags::ROWS_PER_STRIP => "RowsPerStrip",
        tags::STRIP_BYTE_COUNTS => "StripByteCounts",
        tags::PLANAR_CONFIGURATION => "PlanarConfiguration",
        tags::SOFTWARE => "Software",
        tags::TILE_WIDTH => "TileWidth",
        tags::TILE_LENGTH => "TileLength",
        tags::TILE_OFFSETS => "TileOffsets",
        tags::TILE_BYTE_COUNTS => "TileByteCounts",
        tags::SAMPLE_FORMAT => "SampleFormat",
        _ => "Unknown",
    }
}

/// Get the name of a TIFF field type, or "Unknown"
pub fn get_field_type_name(field_type: u16) -> &'static str {
    match field_type {
        field_types::BYTE => "BYTE",
        field_types::ASCII => "ASCII",
        field_types::SHORT => "SHORT",
        field_types::LONG => "LONG",
        field_types::RATIONAL => "RATIONAL",
        field_types::SBYTE => "SBYTE",
        field_types::UNDEFINED => "UNDEFINED",
        field_types::SSHORT => "SSHORT",
        field_types::SLONG => "SLONG",
        field_types::SRATIONAL => "SRATIONAL",
        field_types::FLOAT => "FLOAT",
        field_types::DOUBLE => "DOUBLE",
        field_types::LONG8 => "LONG8",
        field_types::SLONG8 => "SLONG8",
        field_types::IFD8 => "IFD8",
        _ => "Unknown",
    }
}
