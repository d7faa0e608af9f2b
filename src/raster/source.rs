//! Raster source abstraction
//!
//! A `RasterSource` is anything that knows its shape and dtype and can
//! read a (possibly strided) region on request. The tiling core only talks
//! to this trait, so it never depends on how the bytes are mapped.

use ndarray::ArrayD;

use crate::errors::TileResult;
use crate::raster::dtype::DType;
use crate::raster::region::RegionBox;

/// Read access to an N-dimensional raster without materializing it
pub trait RasterSource {
    /// Shape of the raster, C order
    fn shape(&self) -> &[usize];

    /// Element type of the stored data
    fn dtype(&self) -> DType;

    /// Read every `steps[axis]`-th element of `region` along each axis
    ///
    /// The result has `ceil(extent / step)` entries per axis.
    fn read_strided(&self, region: &RegionBox, steps: &[usize]) -> TileResult<ArrayD<f64>>;

    /// Read a dense region
    fn read_region(&self, region: &RegionBox) -> TileResult<ArrayD<f64>> {
        self.read_strided(region, &vec![1; region.ndim()])
    }

    /// Number of axes
    fn ndim(&self) -> usize {
        self.shape().len()
    }
}

/// Lazy view of one region of a raster source
///
/// Creating a view reads nothing; the data is fetched when `read` is
/// called, and again on every call.
#[derive(Debug)]
pub struct TileView<'a, S: RasterSource + ?Sized> {
    source: &'a S,
    region: RegionBox,
}

impl<'a, S: RasterSource + ?Sized> TileView<'a, S> {
    /// Create a view of `region` over `source`
    pub fn new(source: &'a S, region: RegionBox) -> Self {
        TileView { source, region }
    }

    /// The bounding box of the view
    pub fn region(&self) -> &RegionBox {
        &self.region
    }

    /// Start coordinates of the view in the full raster
    pub fn offset(&self) -> &[usize] {
        self.region.start()
    }

    /// Shape of the data the view will produce
    pub fn shape(&self) -> Vec<usize> {
        self.region.shape()
    }

    /// Number of elements in the view
    pub fn len(&self) -> usize {
        self.region.len()
    }

    /// Whether the view selects nothing
    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    /// Materialize the view into an owned array
    pub fn read(&self) -> TileResult<ArrayD<f64>> {
        self.source.read_region(&self.region)
    }
}

impl<S: RasterSource + ?Sized> Clone for TileView<'_, S> {
    fn clone(&self) -> Self {
        TileView {
            source: self.source,
            region: self.region.clone(),
        }
    }
}

impl<S: RasterSource + ?Sized> PartialEq for TileView<'_, S> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(self.source, other.source) && self.region == other.region
    }
}
