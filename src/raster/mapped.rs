//! Memory-mapped TIFF raster
//!
//! Opens an uncompressed, stripped TIFF file, locates its pixel array and
//! maps the file into memory. Reads decode only the bytes a region touches,
//! so a tile of a huge file costs as much as the tile itself.

use log::{debug, info, trace};
use memmap2::Mmap;
use ndarray::{ArrayD, IxDyn};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::errors::{TileError, TileResult};
use crate::raster::dtype::DType;
use crate::raster::region::RegionBox;
use crate::raster::source::RasterSource;
use crate::tiff::layout::RasterLayout;
use crate::tiff::reader::TiffReader;

/// File extensions accepted by [`MappedRaster::open`]
const TIFF_EXTENSIONS: [&str; 2] = ["tif", "tiff"];

/// A TIFF pixel array addressed through a read-only memory map
#[derive(Debug)]
pub struct MappedRaster {
    path: PathBuf,
    layout: RasterLayout,
    /// C-order element strides of `layout.shape`
    strides: Vec<usize>,
    mmap: Mmap,
}

impl MappedRaster {
    /// Opens and maps the TIFF file at `path`
    ///
    /// Fails when the path does not name a `.tif`/`.tiff` file, cannot be
    /// read, or stores its pixels in a way that cannot be mapped flat
    /// (compressed, tiled or scattered strips).
    pub fn open<P: AsRef<Path>>(path: P) -> TileResult<Self> {
        let path = path.as_ref();
        check_extension(path)?;

        let path_str = path.to_str().ok_or_else(|| {
            TileError::UnsupportedFormat(format!("path is not valid UTF-8: {}", path.display()))
        })?;

        let mut tiff_reader = TiffReader::new();
        let tiff = tiff_reader.load(path_str)?;
        debug!("Parsed {}", tiff);

        let file = File::open(path)?;
        let mut reader = BufReader::new(file.try_clone()?);
        let layout = RasterLayout::discover(&tiff, &tiff_reader, &mut reader)?;

        // Safety: the map is read-only; the file must not be truncated while
        // it is open, the same contract every memory-mapped reader carries.
        let mmap = unsafe { Mmap::map(&file)? };

        let end = layout.data_offset + layout.nbytes;
        if (mmap.len() as u64) < end {
            return Err(TileError::UnsupportedLayout(format!(
                "mapped {} bytes but the pixel data ends at {}",
                mmap.len(), end
            )));
        }

        info!("Mapped {} as {} {:?}", path.display(), layout.dtype, layout.shape);

        Ok(MappedRaster {
            path: path.to_path_buf(),
            strides: c_strides(&layout.shape),
            layout,
            mmap,
        })
    }

    /// Path the raster was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Layout of the pixel array inside the file
    pub fn layout(&self) -> &RasterLayout {
        &self.layout
    }

    /// Bytes of `count` elements starting at flat element index `index`
    fn element_bytes(&self, index: usize, count: usize) -> TileResult<&[u8]> {
        let itemsize = self.layout.dtype.itemsize();
        let start = self.layout.data_offset as usize + index * itemsize;
        let end = start + count * itemsize;

        self.mmap.get(start..end).ok_or_else(|| {
            TileError::GenericError(format!(
                "element range {}..{} lies outside the mapped file",
                index, index + count
            ))
        })
    }
}

impl RasterSource for MappedRaster {
    fn shape(&self) -> &[usize] {
        &self.layout.shape
    }

    fn dtype(&self) -> DType {
        self.layout.dtype
    }

    fn read_strided(&self, region: &RegionBox, steps: &[usize]) -> TileResult<ArrayD<f64>> {
        region.check_within(&self.layout.shape)?;
        check_steps(steps, region.ndim())?;

        let out_shape = strided_shape(region, steps);
        let total: usize = out_shape.iter().product();
        let mut values = Vec::with_capacity(total);

        if total > 0 {
            let handler = self.layout.byte_order.create_handler();
            let dtype = self.layout.dtype;
            let last = region.ndim() - 1;
            let run = out_shape[last];
            let contiguous = steps[last] == 1;

            trace!("Reading {} from {} (steps {:?}, contiguous rows: {})",
                   region, self.path.display(), steps, contiguous);

            // Odometer over every axis but the last
            let mut counter = vec![0usize; last];
            loop {
                let row_start: usize = (0..last)
                    .map(|i| (region.start()[i] + counter[i] * steps[i]) * self.strides[i])
                    .sum::<usize>()
                    + region.start()[last];

                if contiguous {
                    handler.decode_samples(self.element_bytes(row_start, run)?, dtype, &mut values);
                } else {
                    for k in 0..run {
                        let bytes = self.element_bytes(row_start + k * steps[last], 1)?;
                        handler.decode_samples(bytes, dtype, &mut values);
                    }
                }

                if !advance(&mut counter, &out_shape[..last]) {
                    break;
                }
            }
        }

        ArrayD::from_shape_vec(IxDyn(&out_shape), values)
            .map_err(|e| TileError::GenericError(format!("Failed to shape region {}: {}", region, e)))
    }
}

/// Rejects paths without a TIFF extension
fn check_extension(path: &Path) -> TileResult<()> {
    let extension = path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension {
        Some(ext) if TIFF_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(TileError::UnsupportedFormat(format!(
            "{} is not a .tif or .tiff file",
            path.display()
        ))),
    }
}

/// Checks that there is one positive step per axis
pub(crate) fn check_steps(steps: &[usize], ndim: usize) -> TileResult<()> {
    if steps.len() != ndim {
        return Err(TileError::GenericError(format!(
            "got {} steps for a region with {} axes",
            steps.len(), ndim
        )));
    }
    if steps.contains(&0) {
        return Err(TileError::GenericError("read steps must be at least 1".to_string()));
    }
    Ok(())
}

/// Shape of a strided read: `ceil(extent / step)` per axis
pub(crate) fn strided_shape(region: &RegionBox, steps: &[usize]) -> Vec<usize> {
    region.shape().iter().zip(steps).map(|(&n, &s)| n.div_ceil(s)).collect()
}

/// C-order strides, in elements
fn c_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Steps a row-major counter; returns false once it wraps around
fn advance(counter: &mut [usize], limits: &[usize]) -> bool {
    for i in (0..counter.len()).rev() {
        counter[i] += 1;
        if counter[i] < limits[i] {
            return true;
        }
        counter[i] = 0;
    }
    false
}
