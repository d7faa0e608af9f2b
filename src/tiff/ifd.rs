//! Image File Directory (IFD) structures and methods
//!
//! An IFD is the metadata block of one TIFF page: a collection of tag
//! entries describing dimensions, sample layout and where the pixel
//! data lives in the file.

use std::collections::HashMap;
use std::fmt;
use log::{debug, trace};

use crate::tiff::constants::{field_types, subfile, tags};
use crate::utils::tag_utils;

/// Represents an Image File Directory (IFD) in a TIFF file
#[derive(Debug, Clone)]
pub struct IFD {
    /// Entries in this IFD
    pub entries: Vec<IFDEntry>,
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in the file
    pub offset: u64,
    /// Cached tag values for quick lookup
    tag_map: HashMap<u16, IFDEntry>,
}

/// Represents an entry in an Image File Directory (IFD)
///
/// Small values are stored directly in the entry. In that case
/// `inline_values` holds them decoded with the file's byte order and
/// `value_offset` holds the first of them; otherwise `value_offset`
/// points at the value array.
#[derive(Debug, Clone)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Value or offset to values
    pub value_offset: u64,
    /// Decoded values when they fit inside the entry
    pub inline_values: Option<Vec<u64>>,
}

impl IFDEntry {
    /// Creates a new IFD entry whose value field is taken verbatim
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64) -> Self {
        trace!("Creating IFD entry: tag={} ({}), type={} ({}), count={}, offset/value={}",
               tag, tag_utils::get_tag_name(tag), field_type,
               tag_utils::get_field_type_name(field_type), count, value_offset);

        Self {
            tag,
            field_type,
            count,
            value_offset,
            inline_values: None,
        }
    }

    /// Creates an entry whose values were stored inline
    pub fn with_inline_values(tag: u16, field_type: u16, count: u64, values: Vec<u64>) -> Self {
        let first = values.first().copied().unwrap_or(0);
        let mut entry = Self::new(tag, field_type, count, first);
        entry.inline_values = Some(values);
        entry
    }

    /// Size in bytes of a single value of this entry's field type
    pub fn get_field_type_size(&self) -> usize {
        field_type_size(self.field_type)
    }

    /// Determines if the value is stored inline in the entry rather than
    /// at the offset location
    pub fn is_value_inline(&self, is_big_tiff: bool) -> bool {
        let total_size = (self.get_field_type_size() as u64).saturating_mul(self.count);
        let inline_size = if is_big_tiff { 8 } else { 4 };
        total_size <= inline_size
    }
}

/// Size in bytes of one value of a TIFF field type
pub fn field_type_size(field_type: u16) -> usize {
    match field_type {
        field_types::BYTE | field_types::ASCII | field_types::SBYTE | field_types::UNDEFINED => 1,
        field_types::SHORT | field_types::SSHORT => 2,
        field_types::LONG | field_types::SLONG | field_types::FLOAT => 4,
        field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE => 8,
        field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
        _ => {
            debug!("Unknown field type: {}, assuming 1 byte", field_type);
            1
        }
    }
}

impl IFD {
    /// Creates a new, empty IFD
    pub fn new(number: usize, offset: u64) -> Self {
        debug!("Creating new IFD #{} at offset {}", number, offset);

        Self {
            entries: Vec::new(),
            number,
            offset,
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry to this IFD and its lookup cache
    pub fn add_entry(&mut self, entry: IFDEntry) {
        self.tag_map.insert(entry.tag, entry.clone());
        self.entries.push(entry);
    }

    /// Gets a tag value (value_offset) directly
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        self.tag_map.get(&tag).map(|entry| entry.value_offset)
    }

    /// Checks if this IFD has a specific tag
    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    /// Gets an IFD entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag)
    }

    /// Gets the (width, height) of the image if both tags are present
    pub fn get_dimensions(&self) -> Option<(u64, u64)> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Returns number of samples per pixel (default 1 if not specified)
    pub fn get_samples_per_pixel(&self) -> u64 {
        self.get_tag_value(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// Whether this page is a reduced resolution overview of another page
    pub fn is_overview(&self) -> bool {
        self.get_tag_value(tags::NEW_SUBFILE_TYPE)
            .map(|v| v & subfile::REDUCED_RESOLUTION != 0)
            .unwrap_or(false)
    }

    /// Whether the pixel data is organized in tiles instead of strips
    pub fn is_tiled(&self) -> bool {
        self.has_tag(tags::TILE_WIDTH) && self.has_tag(tags::TILE_LENGTH)
    }

    /// Gets the number of entries in this IFD
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for IFD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IFD #{} (offset: {})", self.number, self.offset)?;
        writeln!(f, "  Number of entries: {}", self.entries.len())?;

        if let Some((width, height)) = self.get_dimensions() {
            writeln!(f, "  Dimensions: {}x{}", width, height)?;
        }

        writeln!(f, "  Samples per pixel: {}", self.get_samples_per_pixel())?;

        writeln!(f, "  Tags:")?;
        for entry in &self.entries {
            writeln!(f, "    {} ({}): {} [{}]",
                     entry.tag,
                     tag_utils::get_tag_name(entry.tag),
                     entry.value_offset,
                     tag_utils::get_field_type_name(entry.field_type))?;
        }

        Ok(())
    }
}
