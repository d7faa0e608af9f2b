//! In-memory raster source
//!
//! Wraps an owned `ndarray` array so the tiling machinery can run on data
//! that never touched a file.

use ndarray::{ArrayD, Slice};

use crate::errors::{TileError, TileResult};
use crate::raster::dtype::DType;
use crate::raster::mapped::check_steps;
use crate::raster::region::RegionBox;
use crate::raster::source::RasterSource;

/// Raster source backed by an owned array
#[derive(Debug, Clone)]
pub struct ArraySource {
    data: ArrayD<f64>,
    dtype: DType,
}

impl ArraySource {
    /// Wraps `data`; its dtype is reported as float64
    pub fn new(data: ArrayD<f64>) -> TileResult<Self> {
        Self::with_dtype(data, DType::F64)
    }

    /// Wraps `data`, reporting `dtype` as the element type of the source
    pub fn with_dtype(data: ArrayD<f64>, dtype: DType) -> TileResult<Self> {
        if data.ndim() == 0 {
            return Err(TileError::ConfigurationError(
                "raster source needs at least one axis".to_string(),
            ));
        }
        Ok(ArraySource { data, dtype })
    }

    /// The wrapped array
    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }
}

impl RasterSource for ArraySource {
    fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    fn dtype(&self) -> DType {
        self.dtype
    }

    fn read_strided(&self, region: &RegionBox, steps: &[usize]) -> TileResult<ArrayD<f64>> {
        region.check_within(self.data.shape())?;
        check_steps(steps, region.ndim())?;

        let view = self.data.slice_each_axis(|ax| {
            let i = ax.axis.index();
            Slice::new(
                region.start()[i] as isize,
                Some(region.stop()[i] as isize),
                steps[i] as isize,
            )
        });

        Ok(view.to_owned())
    }
}
