//! Tile index enumeration
//!
//! Tiles are numbered row-major over the tiled axes, the first tiled axis
//! varying slowest. A tile can be named by that flat number or by one
//! coordinate per tiled axis.

use crate::errors::{TileError, TileResult};
use crate::raster::region::RegionBox;
use crate::tiling::geometry::TileGeometry;

/// Address of a tile in the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileIndex {
    /// Row-major position over the tiled axes
    Flat(usize),
    /// One coordinate per tiled axis
    Coords(Vec<usize>),
}

impl From<usize> for TileIndex {
    fn from(index: usize) -> Self {
        TileIndex::Flat(index)
    }
}

impl From<Vec<usize>> for TileIndex {
    fn from(coords: Vec<usize>) -> Self {
        TileIndex::Coords(coords)
    }
}

impl From<&[usize]> for TileIndex {
    fn from(coords: &[usize]) -> Self {
        TileIndex::Coords(coords.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for TileIndex {
    fn from(coords: [usize; N]) -> Self {
        TileIndex::Coords(coords.to_vec())
    }
}

/// Maps tile indices to regions of the raster
#[derive(Debug, Clone, Copy)]
pub struct TileIndexer<'g> {
    geometry: &'g TileGeometry,
}

impl<'g> TileIndexer<'g> {
    pub fn new(geometry: &'g TileGeometry) -> Self {
        TileIndexer { geometry }
    }

    pub fn geometry(&self) -> &'g TileGeometry {
        self.geometry
    }

    /// Number of tiles
    pub fn len(&self) -> usize {
        self.geometry.len()
    }

    /// Always false for a resolved geometry
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fresh enumeration of every tile's coordinates
    pub fn indices(&self) -> TileIndices {
        TileIndices {
            counts: self.geometry.counts(),
            next: 0,
            len: self.geometry.len(),
        }
    }

    /// Grid coordinates of `index`, checked against the tile counts
    pub fn coords(&self, index: &TileIndex) -> TileResult<Vec<usize>> {
        let counts = self.geometry.counts();
        match index {
            TileIndex::Flat(flat) => {
                if *flat >= self.len() {
                    return Err(TileError::IndexError(format!(
                        "tile {} is out of range for {} tiles",
                        flat, self.len()
                    )));
                }
                Ok(unravel(*flat, &counts))
            }
            TileIndex::Coords(coords) => {
                if coords.len() != counts.len() {
                    return Err(TileError::IndexError(format!(
                        "tile coordinates {:?} need one entry per tiled axis ({})",
                        coords, counts.len()
                    )));
                }
                if let Some(i) = (0..coords.len()).find(|&i| coords[i] >= counts[i]) {
                    return Err(TileError::IndexError(format!(
                        "tile coordinate {} on axis {} is out of range for {} tiles",
                        coords[i], self.geometry.axes()[i].axis, counts[i]
                    )));
                }
                Ok(coords.clone())
            }
        }
    }

    /// Bounding box of the tile at `index`
    pub fn get_box(&self, index: &TileIndex) -> TileResult<RegionBox> {
        let coords = self.coords(index)?;
        Ok(self.box_for(&coords))
    }

    /// Bounding box for coordinates already known to be in range
    pub(crate) fn box_for(&self, coords: &[usize]) -> RegionBox {
        let shape = self.geometry.shape();
        let mut region = RegionBox::full(shape);
        for (tiling, &c) in self.geometry.axes().iter().zip(coords) {
            let length = shape[tiling.axis];
            let start = (c * tiling.step).min(length);
            let stop = (start + tiling.extent).min(length);
            region = region.with_axis(tiling.axis, start, stop);
        }
        region
    }
}

/// Row-major iterator over tile coordinates
#[derive(Debug, Clone)]
pub struct TileIndices {
    counts: Vec<usize>,
    next: usize,
    len: usize,
}

impl Iterator for TileIndices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.len {
            return None;
        }
        let coords = unravel(self.next, &self.counts);
        self.next += 1;
        Some(coords)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileIndices {}

/// Flat row-major position to per-axis coordinates
fn unravel(mut flat: usize, counts: &[usize]) -> Vec<usize> {
    let mut coords = vec![0; counts.len()];
    for i in (0..counts.len()).rev() {
        coords[i] = flat % counts[i];
        flat /= counts[i];
    }
    coords
}
