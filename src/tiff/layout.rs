//! Raster layout discovery
//!
//! Works out whether the pixel data of a TIFF can be addressed as one flat
//! C-ordered array (uncompressed, stripped, every page stored back to back)
//! and, if so, where that array starts and what its shape and dtype are.

use log::{debug, info, warn};

use crate::errors::{TileError, TileResult};
use crate::io::byte_order::ByteOrder;
use crate::io::seekable::SeekableReader;
use crate::raster::dtype::DType;
use crate::tiff::constants::{compression, planar, sample_format, tags};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::tiff::types::TIFF;
use crate::tiff::validation;

/// Location and interpretation of the contiguous pixel array of a TIFF
#[derive(Debug, Clone, PartialEq)]
pub struct RasterLayout {
    /// Array shape, C order
    pub shape: Vec<usize>,
    /// Element type
    pub dtype: DType,
    /// Byte order of the elements
    pub byte_order: ByteOrder,
    /// File offset of the first element
    pub data_offset: u64,
    /// Size of the array in bytes
    pub nbytes: u64,
}

/// Per-page sample description, must be identical across pages
#[derive(Debug, Clone, PartialEq)]
struct PageFormat {
    width: u64,
    height: u64,
    samples: u64,
    bits: u64,
    format: u64,
    planar: u64,
}

impl RasterLayout {
    /// Number of elements in the array
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    /// Whether the array has no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discovers the layout of a parsed TIFF
    ///
    /// # Arguments
    /// * `tiff` - The parsed TIFF structure
    /// * `tiff_reader` - Reader that parsed `tiff`, used for tag arrays
    /// * `reader` - Stream over the same file
    pub fn discover(tiff: &TIFF, tiff_reader: &TiffReader, reader: &mut dyn SeekableReader) -> TileResult<Self> {
        let pages = tiff.pages();
        let first = *pages.first()
            .ok_or_else(|| TileError::UnsupportedLayout("file contains no image pages".to_string()))?;

        let format = read_page_format(first, tiff_reader, reader)?;
        let dtype = DType::from_tiff(format.bits, format.format)?;
        debug!("Page format: {:?} -> {}", format, dtype);

        let file_size = validation::get_file_size(reader)?;
        let itemsize = dtype.itemsize() as u64;
        let mut data_offset = None;
        let mut next_expected = 0u64;

        for (page_index, page) in pages.iter().enumerate() {
            if page.number != first.number && read_page_format(page, tiff_reader, reader)? != format {
                return Err(TileError::UnsupportedLayout(format!(
                    "page {} differs in shape or sample format from page {}",
                    page.number, first.number
                )));
            }

            let offsets = tiff_reader.read_tag_values(reader, page, tags::STRIP_OFFSETS)?;
            let counts = tiff_reader.read_tag_values(reader, page, tags::STRIP_BYTE_COUNTS)?;
            if offsets.len() != counts.len() {
                return Err(TileError::UnsupportedLayout(format!(
                    "page {} has {} strip offsets but {} byte counts",
                    page.number, offsets.len(), counts.len()
                )));
            }

            let strips = StripPlan::for_page(page, &format, itemsize)?;
            if offsets.len() as u64 != strips.len() {
                return Err(TileError::UnsupportedLayout(format!(
                    "page {} has {} strips but its rows per strip imply {}",
                    page.number, offsets.len(), strips.len()
                )));
            }

            let last_page = page_index + 1 == pages.len();
            let strip_count = offsets.len();
            for (strip, (offset, count)) in offsets.into_iter().zip(counts).enumerate() {
                let required = strips.strip_bytes(strip as u64);
                if data_offset.is_none() {
                    data_offset = Some(offset);
                    next_expected = offset;
                } else if offset != next_expected {
                    return Err(TileError::UnsupportedLayout(format!(
                        "strip at offset {} in page {} is not contiguous with the previous strip (expected {})",
                        offset, page.number, next_expected
                    )));
                }

                if count < required {
                    return Err(TileError::UnsupportedLayout(format!(
                        "strip {} of page {} holds {} bytes but {} are needed",
                        strip, page.number, count, required
                    )));
                }
                if count > required {
                    // Only trailing bytes after the very last strip leave every element in place
                    if !(last_page && strip + 1 == strip_count) {
                        return Err(TileError::UnsupportedLayout(format!(
                            "strip {} of page {} is padded ({} bytes for {} of data)",
                            strip, page.number, count, required
                        )));
                    }
                    warn!("Last strip holds {} bytes, {} more than the pixel data needs", count, count - required);
                }
                next_expected = next_expected.saturating_add(required);
            }
        }

        let data_offset = data_offset
            .ok_or_else(|| TileError::UnsupportedLayout("file contains no strips".to_string()))?;

        let elements = pages.len() as u64 * format.height * format.width * format.samples;
        let expected = elements * itemsize;
        if next_expected - data_offset != expected {
            return Err(TileError::UnsupportedLayout(format!(
                "strips hold {} bytes but {} are needed for {} elements",
                next_expected - data_offset, expected, elements
            )));
        }
        validation::validate_byte_range(data_offset, expected, file_size, "pixel data")?;

        let described = describe_shape(first, tiff_reader, reader, elements);
        let shape = described.unwrap_or_else(|| default_shape(pages.len(), &format));

        info!("Raster layout: shape {:?}, dtype {}, {} bytes at offset {}",
              shape, dtype, expected, data_offset);

        Ok(RasterLayout {
            shape,
            dtype,
            byte_order: tiff.byte_order,
            data_offset,
            nbytes: expected,
        })
    }
}

/// Expected strip sizes of one page
///
/// Strips run through each sample plane in turn; the last strip of a plane
/// covers whatever rows remain.
#[derive(Debug, Clone, Copy)]
struct StripPlan {
    height: u64,
    rows_per_strip: u64,
    row_bytes: u64,
    planes: u64,
}

impl StripPlan {
    fn for_page(ifd: &IFD, format: &PageFormat, itemsize: u64) -> TileResult<Self> {
        let rows_per_strip = ifd.get_tag_value(tags::ROWS_PER_STRIP)
            .unwrap_or(format.height)
            .min(format.height);
        if rows_per_strip == 0 && format.height > 0 {
            return Err(TileError::UnsupportedLayout(format!(
                "page {} declares zero rows per strip",
                ifd.number
            )));
        }

        let (row_bytes, planes) = if format.planar == planar::PLANAR && format.samples > 1 {
            (format.width.saturating_mul(itemsize), format.samples)
        } else {
            (format.width.saturating_mul(format.samples).saturating_mul(itemsize), 1)
        };

        Ok(StripPlan { height: format.height, rows_per_strip, row_bytes, planes })
    }

    fn strips_per_plane(&self) -> u64 {
        if self.rows_per_strip == 0 {
            0
        } else {
            self.height.div_ceil(self.rows_per_strip)
        }
    }

    /// Number of strips the page must have
    fn len(&self) -> u64 {
        self.strips_per_plane() * self.planes
    }

    /// Data bytes of strip `index`, excluding any padding
    fn strip_bytes(&self, index: u64) -> u64 {
        let first_row = (index % self.strips_per_plane().max(1)) * self.rows_per_strip;
        let rows = self.rows_per_strip.min(self.height.saturating_sub(first_row));
        rows.saturating_mul(self.row_bytes)
    }
}

/// Reads and checks the sample layout tags of one page
fn read_page_format(ifd: &IFD, tiff_reader: &TiffReader, reader: &mut dyn SeekableReader) -> TileResult<PageFormat> {
    if ifd.is_tiled() {
        return Err(TileError::UnsupportedLayout(format!(
            "page {} stores pixels in tiles; only stripped files can be mapped",
            ifd.number
        )));
    }

    let compression = ifd.get_tag_value(tags::COMPRESSION).unwrap_or(compression::NONE as u64);
    if compression != compression::NONE as u64 {
        return Err(TileError::UnsupportedLayout(format!(
            "page {} is compressed (code {}); only uncompressed files can be mapped",
            ifd.number, compression
        )));
    }

    let width = ifd.get_tag_value(tags::IMAGE_WIDTH).ok_or(TileError::TagNotFound(tags::IMAGE_WIDTH))?;
    let height = ifd.get_tag_value(tags::IMAGE_LENGTH).ok_or(TileError::TagNotFound(tags::IMAGE_LENGTH))?;
    let samples = ifd.get_samples_per_pixel();

    let bits = uniform_tag_value(ifd, tiff_reader, reader, tags::BITS_PER_SAMPLE, 1)?;
    let format = uniform_tag_value(ifd, tiff_reader, reader, tags::SAMPLE_FORMAT, sample_format::UINT)?;
    let planar = ifd.get_tag_value(tags::PLANAR_CONFIGURATION).unwrap_or(planar::CHUNKY);

    Ok(PageFormat { width, height, samples, bits, format, planar })
}

/// Reads a per-sample tag whose values must all agree
fn uniform_tag_value(
    ifd: &IFD,
    tiff_reader: &TiffReader,
    reader: &mut dyn SeekableReader,
    tag: u16,
    default: u64,
) -> TileResult<u64> {
    if !ifd.has_tag(tag) {
        return Ok(default);
    }

    let values = tiff_reader.read_tag_values(reader, ifd, tag)?;
    let first = values.first().copied().unwrap_or(default);
    if values.iter().any(|&v| v != first) {
        return Err(TileError::UnsupportedLayout(format!(
            "page {} mixes values {:?} for tag {}",
            ifd.number, values, tag
        )));
    }

    Ok(first)
}

/// Shape recorded in a JSON image description (`{"shape": [...]}`)
///
/// Returns None when there is no description, it is not JSON, or its
/// shape does not account for exactly `elements` elements.
fn describe_shape(ifd: &IFD, tiff_reader: &TiffReader, reader: &mut dyn SeekableReader, elements: u64) -> Option<Vec<usize>> {
    if !ifd.has_tag(tags::IMAGE_DESCRIPTION) {
        return None;
    }

    let description = tiff_reader.read_ascii_tag(reader, ifd, tags::IMAGE_DESCRIPTION).ok()?;
    let value: serde_json::Value = serde_json::from_str(description.trim()).ok()?;
    let shape: Vec<usize> = value.get("shape")?
        .as_array()?
        .iter()
        .map(|v| v.as_u64().map(|n| n as usize))
        .collect::<Option<_>>()?;

    if shape.is_empty() || shape.iter().map(|&n| n as u64).product::<u64>() != elements {
        warn!("Ignoring description shape {:?}, it does not match {} elements", shape, elements);
        return None;
    }

    debug!("Shape from image description: {:?}", shape);
    Some(shape)
}

/// Shape implied by the page structure alone
///
/// Multiple pages add a leading page axis; multiple samples add a trailing
/// axis (chunky) or a leading one (planar).
fn default_shape(page_count: usize, format: &PageFormat) -> Vec<usize> {
    let mut shape = Vec::with_capacity(4);
    if page_count > 1 {
        shape.push(page_count);
    }

    let samples = format.samples as usize;
    let (height, width) = (format.height as usize, format.width as usize);

    if samples > 1 && format.planar == planar::PLANAR {
        shape.extend([samples, height, width]);
    } else {
        shape.extend([height, width]);
        if samples > 1 {
            shape.push(samples);
        }
    }

    shape
}
