//! Tile geometry
//!
//! Turns a raster shape and resolved parameters into the per-axis tile
//! extent, step and count. All tiled axes share one extent `e`, the largest
//! integer with `e^k <= pixel_max` for `k` tiled axes, clamped to each
//! axis length. The last tile on an axis is clipped at the raster edge.

use log::info;
use std::fmt;

use crate::errors::TileResult;
use crate::tiling::config::{ResolvedConfig, TileConfig};

/// How one axis is cut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisTiling {
    /// Raster axis index
    pub axis: usize,
    /// Tile extent along the axis
    pub extent: usize,
    /// Distance between consecutive tile starts
    pub step: usize,
    /// Number of tiles along the axis
    pub count: usize,
}

/// Grid of tiles over a raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGeometry {
    shape: Vec<usize>,
    axes: Vec<AxisTiling>,
}

impl TileGeometry {
    /// Shape of the tiled raster
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Tiling of each tiled axis, in axis order
    pub fn axes(&self) -> &[AxisTiling] {
        &self.axes
    }

    /// Indices of the tiled axes
    pub fn tile_axes(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.axis).collect()
    }

    /// Whether `axis` is one of the tiled axes
    pub fn is_tiled(&self, axis: usize) -> bool {
        self.axes.iter().any(|a| a.axis == axis)
    }

    /// Tile count along each tiled axis
    pub fn counts(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.count).collect()
    }

    /// Largest per-axis tile count
    pub fn split_factor(&self) -> usize {
        self.axes.iter().map(|a| a.count).max().unwrap_or(1)
    }

    /// Total number of tiles
    pub fn len(&self) -> usize {
        self.axes.iter().map(|a| a.count).product()
    }

    /// Always false; a valid geometry has at least one tile
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for TileGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} tiles over {:?}", self.len(), self.shape)?;
        for a in &self.axes {
            write!(f, "; axis {}: extent {}, step {}, count {}", a.axis, a.extent, a.step, a.count)?;
        }
        Ok(())
    }
}

/// Computes tile geometry from a shape and parameters
pub struct GeometryResolver;

impl GeometryResolver {
    /// Validate `config` against `shape` and compute the grid
    pub fn resolve(shape: &[usize], config: &TileConfig) -> TileResult<TileGeometry> {
        let resolved = config.resolve(shape)?;
        Ok(Self::from_resolved(shape, &resolved))
    }

    /// Compute the grid for parameters already checked against `shape`
    pub fn from_resolved(shape: &[usize], config: &ResolvedConfig) -> TileGeometry {
        let k = config.tile_axes.len() as u32;
        let common = integer_root(config.pixel_max, k);

        let axes = config.tile_axes.iter().map(|&axis| {
            let length = shape[axis];
            let extent = (common.min(length as u64)) as usize;
            let step = ((extent as f64 * (1.0 - config.overlap)).round() as usize).max(1);
            let count = length.div_ceil(step).max(1);
            AxisTiling { axis, extent, step, count }
        }).collect();

        let geometry = TileGeometry { shape: shape.to_vec(), axes };
        info!("Tile geometry: {}", geometry);
        geometry
    }
}

/// Largest `e` with `e^k <= n`, for `n >= 1` and `k >= 1`
fn integer_root(n: u64, k: u32) -> u64 {
    if k <= 1 || n <= 1 {
        return n;
    }

    let fits = |e: u64| (e as u128).checked_pow(k).is_some_and(|p| p <= n as u128);

    // The float estimate is off by at most one either way
    let mut e = (n as f64).powf(1.0 / k as f64).floor() as u64;
    while e > 1 && !fits(e) {
        e -= 1;
    }
    while fits(e + 1) {
        e += 1;
    }
    e.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(shape: &[usize], axes: &[isize], pixel_max: u64, overlap: f64) -> TileGeometry {
        let config = TileConfig::default()
            .with_tile_axes(axes)
            .with_pixel_max(pixel_max)
            .with_overlap(overlap);
        GeometryResolver::resolve(shape, &config).unwrap()
    }

    #[test]
    fn integer_roots_are_exact() {
        assert_eq!(integer_root(2500, 2), 50);
        assert_eq!(integer_root(2499, 2), 49);
        assert_eq!(integer_root(16_000_000, 2), 4000);
        assert_eq!(integer_root(1000, 3), 10);
        assert_eq!(integer_root(999, 3), 9);
        assert_eq!(integer_root(1, 4), 1);
        assert_eq!(integer_root(u64::MAX, 2), 4_294_967_295);
    }

    #[test]
    fn square_budget_splits_in_two() {
        let g = geometry(&[1, 100, 100, 3], &[1, 2], 2500, 0.0);

        assert_eq!(g.axes()[0], AxisTiling { axis: 1, extent: 50, step: 50, count: 2 });
        assert_eq!(g.axes()[1], AxisTiling { axis: 2, extent: 50, step: 50, count: 2 });
        assert_eq!(g.len(), 4);
        assert_eq!(g.split_factor(), 2);
    }

    #[test]
    fn half_overlap_halves_step() {
        let g = geometry(&[1, 100, 100, 3], &[1, 2], 2500, 0.5);

        assert_eq!(g.axes()[0].step, 25);
        assert_eq!(g.counts(), vec![4, 4]);
        assert_eq!(g.len(), 16);
    }

    #[test]
    fn extent_is_clamped_to_short_axes() {
        let g = geometry(&[30, 1000], &[0, 1], 10_000, 0.0);

        assert_eq!(g.axes()[0], AxisTiling { axis: 0, extent: 30, step: 30, count: 1 });
        assert_eq!(g.axes()[1], AxisTiling { axis: 1, extent: 100, step: 100, count: 10 });
        assert_eq!(g.split_factor(), 10);
    }

    #[test]
    fn tiny_budget_keeps_step_positive() {
        let g = geometry(&[5, 5], &[0, 1], 1, 0.9);

        assert_eq!(g.axes()[0].extent, 1);
        assert_eq!(g.axes()[0].step, 1);
        assert_eq!(g.len(), 25);
    }

    #[test]
    fn more_overlap_means_smaller_steps() {
        let steps: Vec<usize> = [0.0, 0.2, 0.4, 0.6, 0.8]
            .iter()
            .map(|&o| geometry(&[1000, 1000], &[0, 1], 10_000, o).axes()[0].step)
            .collect();

        assert_eq!(steps, vec![100, 80, 60, 40, 20]);
        assert!(steps.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn full_overlap_is_rejected() {
        let config = TileConfig::default().with_overlap(1.0);
        assert!(GeometryResolver::resolve(&[100, 100], &config).is_err());
    }
}
