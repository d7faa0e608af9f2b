//! TIFF file reader implementation
//!
//! This module implements the TIFF/BigTIFF structure reader that uses the
//! Strategy pattern to handle different byte orders. Only the header and
//! the IFD chain are parsed here; pixel data is left to the mapped raster.

use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::errors::{TileError, TileResult};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::types::TIFF;
use crate::tiff::validation;
use crate::utils::format_utils;
use crate::utils::ifd_utils;
use crate::utils::string_utils;
use crate::utils::tag_utils;

/// Upper bound on the IFD chain length, guards against offset loops
const MAX_IFDS: usize = 65_536;

/// Reader for TIFF and BigTIFF files
pub struct TiffReader {
    /// Current byte order handler
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Detected byte order
    byte_order: Option<ByteOrder>,
    /// Whether currently reading BigTIFF format
    is_big_tiff: bool,
}

impl Default for TiffReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        TiffReader {
            byte_order_handler: None,
            byte_order: None,
            is_big_tiff: false,
        }
    }

    /// Returns the byte order handler, or an error before a header was read
    fn handler(&self) -> TileResult<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
            .ok_or_else(|| TileError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Loads the TIFF structure of the file at `filepath`
    pub fn load(&mut self, filepath: &str) -> TileResult<TIFF> {
        info!("Loading TIFF file: {}", filepath);

        let file = File::open(Path::new(filepath))?;
        let mut reader = BufReader::with_capacity(1024 * 1024, file);

        self.read(&mut reader)
    }

    /// Reads a TIFF structure from the given reader
    ///
    /// 1. Detect byte order (little/big endian)
    /// 2. Check for TIFF or BigTIFF format
    /// 3. Read all IFDs (Image File Directories)
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TileResult<TIFF> {
        debug!("TiffReader::read starting");
        reader.seek(SeekFrom::Start(0))?;

        let byte_order = format_utils::detect_byte_order(reader)?;
        self.byte_order = Some(byte_order);
        self.byte_order_handler = Some(byte_order.create_handler());

        let (is_big_tiff, _) = format_utils::detect_tiff_format(reader, self.handler()?)?;
        self.is_big_tiff = is_big_tiff;

        let first_ifd_offset = ifd_utils::read_ifd_offset(reader, self.is_big_tiff, self.handler()?)?;
        debug!("First IFD offset: {}", first_ifd_offset);

        let file_size = validation::get_file_size(reader)?;
        validation::validate_ifd_offset(first_ifd_offset, file_size)?;

        let mut tiff = TIFF::new(self.is_big_tiff, byte_order);
        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset, file_size)?;

        info!("Read {} IFDs from TIFF file", tiff.ifds.len());
        Ok(tiff)
    }

    /// Reads a chain of IFDs starting from the given offset
    ///
    /// A broken link ends the chain with a warning; the IFDs read so far
    /// are kept.
    fn read_ifd_chain(&self, reader: &mut dyn SeekableReader, first_ifd_offset: u64, file_size: u64) -> TileResult<Vec<IFD>> {
        let mut ifds = Vec::new();
        let mut ifd_offset = first_ifd_offset;

        while ifd_offset != 0 && ifds.len() < MAX_IFDS {
            if ifd_offset >= file_size {
                warn!("IFD offset {} exceeds file size {}, stopping IFD chain", ifd_offset, file_size);
                break;
            }

            let ifd = match self.read_ifd(reader, ifd_offset, ifds.len()) {
                Ok(ifd) => ifd,
                Err(e) => {
                    warn!("Error reading IFD {}: {}", ifds.len(), e);
                    break;
                }
            };

            let next_position = ifd_utils::next_offset_position(&ifd, self.is_big_tiff);
            let next_ifd_offset = reader.seek(SeekFrom::Start(next_position))
                .map_err(TileError::from)
                .and_then(|_| ifd_utils::read_ifd_offset(reader, self.is_big_tiff, self.handler()?));

            ifds.push(ifd);

            match next_ifd_offset {
                Ok(0) => break,
                Ok(next) if next >= file_size || next < 8 => {
                    warn!("Invalid next IFD offset: {}, stopping IFD chain", next);
                    break;
                }
                Ok(next) => ifd_offset = next,
                Err(e) => {
                    warn!("Error reading next IFD offset: {}", e);
                    break;
                }
            }
        }

        Ok(ifds)
    }

    /// Reads the IFD at `offset`
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> TileResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;

        let handler = self.handler()?;
        let entry_count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u16(reader)? as u64
        };
        debug!("IFD #{} entry count: {}", number, entry_count);

        let mut ifd = IFD::new(number, offset);
        for _ in 0..entry_count {
            let entry = self.read_ifd_entry(reader)?;
            ifd.add_entry(entry);
        }

        Ok(ifd)
    }

    /// Reads a single IFD entry, decoding its value when stored inline
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> TileResult<IFDEntry> {
        let handler = self.handler()?;

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let mut raw = vec![0u8; if self.is_big_tiff { 8 } else { 4 }];
        reader.read_exact(&mut raw)?;

        let mut entry = IFDEntry::new(tag, field_type, count, 0);
        if entry.is_value_inline(self.is_big_tiff) {
            if let Ok(values) = tag_utils::decode_inline_values(&raw, field_type, count, handler) {
                return Ok(IFDEntry::with_inline_values(tag, field_type, count, values));
            }
        }

        let mut cursor = std::io::Cursor::new(raw);
        entry.value_offset = ifd_utils::read_ifd_offset(&mut cursor, self.is_big_tiff, handler)?;
        Ok(entry)
    }

    /// Reads a tag's values as a vector of u64
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TileResult<Vec<u64>> {
        let entry = ifd.get_entry(tag)
            .ok_or(TileError::TagNotFound(tag))?;

        if let Some(values) = &entry.inline_values {
            return Ok(values.clone());
        }

        // The count comes from the file; it must fit before anything is allocated
        let byte_len = (entry.get_field_type_size() as u64).saturating_mul(entry.count);
        let file_size = validation::get_file_size(reader)?;
        validation::validate_byte_range(entry.value_offset, byte_len, file_size, "tag values")?;

        reader.seek(SeekFrom::Start(entry.value_offset))?;
        let mut values = Vec::with_capacity(entry.count as usize);
        tag_utils::read_tag_value_array(reader, entry.field_type, entry.count, self.handler()?, &mut values)?;

        Ok(values)
    }

    /// Reads an ASCII tag as a string, with trailing nulls removed
    pub fn read_ascii_tag(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TileResult<String> {
        let mut buffer: Vec<u8> = self.read_tag_values(reader, ifd, tag)?
            .into_iter()
            .map(|v| v as u8)
            .collect();

        string_utils::trim_trailing_nulls(&mut buffer);

        String::from_utf8(buffer)
            .map_err(|e| TileError::GenericError(format!("Invalid UTF-8 string: {}", e)))
    }

    /// Returns whether the current file is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Gets the detected byte order, if a header was read
    pub fn byte_order(&self) -> Option<ByteOrder> {
        self.byte_order
    }
}
