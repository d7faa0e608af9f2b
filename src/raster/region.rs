//! N-dimensional region box
//!
//! A `RegionBox` selects a hyper-rectangle of a raster by its start
//! (inclusive) and stop (exclusive) coordinate on every axis, in element
//! units, with (0, ..., 0) at the first element of the array.

use std::fmt;

use crate::errors::{TileError, TileResult};

/// Region of a raster (in element coordinates, one range per axis)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionBox {
    /// First coordinate on each axis
    start: Vec<usize>,
    /// One past the last coordinate on each axis
    stop: Vec<usize>,
}

impl RegionBox {
    /// Create a new region from per-axis start and stop coordinates
    ///
    /// Fails when the two have different lengths or a start exceeds its stop.
    pub fn new(start: Vec<usize>, stop: Vec<usize>) -> TileResult<Self> {
        if start.len() != stop.len() {
            return Err(TileError::GenericError(format!(
                "region start has {} axes but stop has {}",
                start.len(), stop.len()
            )));
        }
        if let Some(axis) = (0..start.len()).find(|&i| start[i] > stop[i]) {
            return Err(TileError::GenericError(format!(
                "region axis {} starts at {} after its stop {}",
                axis, start[axis], stop[axis]
            )));
        }
        Ok(RegionBox { start, stop })
    }

    /// Region covering an entire array of the given shape
    pub fn full(shape: &[usize]) -> Self {
        RegionBox {
            start: vec![0; shape.len()],
            stop: shape.to_vec(),
        }
    }

    /// Start coordinate on each axis
    pub fn start(&self) -> &[usize] {
        &self.start
    }

    /// Stop coordinate (exclusive) on each axis
    pub fn stop(&self) -> &[usize] {
        &self.stop
    }

    /// Number of axes
    pub fn ndim(&self) -> usize {
        self.start.len()
    }

    /// Extent of the region along each axis
    pub fn shape(&self) -> Vec<usize> {
        self.start.iter().zip(&self.stop).map(|(a, b)| b - a).collect()
    }

    /// Number of elements in the region
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    /// Whether the region selects nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the coordinate lies inside the region
    pub fn contains(&self, coords: &[usize]) -> bool {
        coords.len() == self.ndim()
            && coords.iter().enumerate().all(|(i, &c)| c >= self.start[i] && c < self.stop[i])
    }

    /// Restrict one axis to `[start, stop)`
    pub fn with_axis(mut self, axis: usize, start: usize, stop: usize) -> Self {
        self.start[axis] = start;
        self.stop[axis] = stop;
        self
    }

    /// Checks that the region has the rank of `shape` and fits inside it
    pub fn check_within(&self, shape: &[usize]) -> TileResult<()> {
        if self.ndim() != shape.len() {
            return Err(TileError::GenericError(format!(
                "region has {} axes but the raster has {}",
                self.ndim(), shape.len()
            )));
        }
        if let Some(axis) = (0..shape.len()).find(|&i| self.stop[i] > shape[i]) {
            return Err(TileError::GenericError(format!(
                "region stops at {} on axis {} of length {}",
                self.stop[axis], axis, shape[axis]
            )));
        }
        Ok(())
    }
}

impl fmt::Display for RegionBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, (a, b)) in self.start.iter().zip(&self.stop).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", a, b)?;
        }
        write!(f, "]")
    }
}
