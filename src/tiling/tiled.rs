//! Tiled raster
//!
//! Owns a raster source, the tiling parameters and everything derived from
//! them (resolved axes, geometry, normalization bounds). The derived state is
//! rebuilt by `update()` and replaced only when the rebuild succeeds.

use log::{info, warn};
use ndarray::ArrayD;
use std::path::Path;

use crate::errors::TileResult;
use crate::raster::mapped::MappedRaster;
use crate::raster::region::RegionBox;
use crate::raster::source::{RasterSource, TileView};
use crate::tiling::config::{ResolvedConfig, TileConfig};
use crate::tiling::geometry::{GeometryResolver, TileGeometry};
use crate::tiling::indexer::{TileIndex, TileIndexer};
use crate::tiling::normalizer::{Normalizer, QuantileBounds};
use crate::tiling::producer::TileProducer;

/// Everything computed from the source shape and the parameters
#[derive(Debug, Clone)]
struct TileState {
    resolved: ResolvedConfig,
    geometry: TileGeometry,
    normalizer: Normalizer,
}

impl TileState {
    fn build<S: RasterSource + ?Sized>(source: &S, config: &TileConfig) -> TileResult<Self> {
        let shape = source.shape().to_vec();
        let resolved = config.resolve(&shape)?;
        let geometry = GeometryResolver::from_resolved(&shape, &resolved);
        let normalizer = Normalizer::compute(
            source,
            &geometry,
            resolved.channel_axis,
            resolved.scale_quantile,
        )?;

        Ok(TileState { resolved, geometry, normalizer })
    }
}

/// A raster cut into tiles that can be read one at a time
#[derive(Debug)]
pub struct TiledRaster<S: RasterSource = MappedRaster> {
    source: S,
    config: TileConfig,
    state: TileState,
}

impl TiledRaster<MappedRaster> {
    /// Map the TIFF at `path` and tile it
    pub fn open<P: AsRef<Path>>(path: P, config: TileConfig) -> TileResult<Self> {
        let source = MappedRaster::open(path)?;
        Self::new(source, config)
    }
}

impl<S: RasterSource> TiledRaster<S> {
    /// Tile `source` with `config`
    ///
    /// Parameters are checked and bounds computed here, so a bad
    /// configuration fails now and never during iteration.
    pub fn new(source: S, config: TileConfig) -> TileResult<Self> {
        let state = TileState::build(&source, &config)?;
        info!("Tiled raster {:?} into {} tiles", source.shape(), state.geometry.len());
        Ok(TiledRaster { source, config, state })
    }

    /// Current parameters
    ///
    /// These may differ from the ones in effect if `config_mut` was used
    /// without a successful `update`.
    pub fn config(&self) -> &TileConfig {
        &self.config
    }

    /// Parameters to change before calling `update`
    pub fn config_mut(&mut self) -> &mut TileConfig {
        &mut self.config
    }

    /// Rebuild geometry and bounds from the current parameters
    ///
    /// The shape is taken from the source again. A `MappedRaster` fixes its
    /// layout when the file is opened, so changes to the file on disk are
    /// not picked up; open it again for that. On error the previous geometry
    /// and bounds stay in effect.
    pub fn update(&mut self) -> TileResult<()> {
        match TileState::build(&self.source, &self.config) {
            Ok(state) => {
                info!("Updated tiling: {}", state.geometry);
                self.state = state;
                Ok(())
            }
            Err(e) => {
                warn!("Tiling update rejected, keeping previous state: {}", e);
                Err(e)
            }
        }
    }

    /// Replace the parameters and update; on failure the old parameters are restored
    pub fn set_config(&mut self, config: TileConfig) -> TileResult<()> {
        let previous = std::mem::replace(&mut self.config, config);
        let result = self.update();
        if result.is_err() {
            self.config = previous;
        }
        result
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Shape of the raster
    pub fn shape(&self) -> &[usize] {
        self.state.geometry.shape()
    }

    /// Parameters currently in effect, checked and with non-negative axes
    pub fn resolved(&self) -> &ResolvedConfig {
        &self.state.resolved
    }

    pub fn geometry(&self) -> &TileGeometry {
        &self.state.geometry
    }

    pub fn bounds(&self) -> &QuantileBounds {
        self.state.normalizer.bounds()
    }

    /// Largest tile count along a tiled axis
    pub fn split_factor(&self) -> usize {
        self.state.geometry.split_factor()
    }

    /// Number of tiles
    pub fn len(&self) -> usize {
        self.state.geometry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn indexer(&self) -> TileIndexer<'_> {
        TileIndexer::new(&self.state.geometry)
    }

    fn producer(&self) -> TileProducer<'_, S> {
        TileProducer::new(&self.source, self.indexer())
    }

    /// Lazy views of every tile, row-major over the tiled axes
    pub fn tiles(&self) -> impl ExactSizeIterator<Item = TileView<'_, S>> + '_ {
        self.producer().tiles()
    }

    /// Start coordinates of every tile, in the order of `tiles`
    pub fn offsets(&self) -> impl ExactSizeIterator<Item = Vec<usize>> + '_ {
        self.producer().offsets()
    }

    /// `(view, offset)` of every tile, in the order of `tiles`
    pub fn split(&self) -> impl ExactSizeIterator<Item = (TileView<'_, S>, Vec<usize>)> + '_ {
        self.producer().split()
    }

    /// View of the tile at `index` (flat number or per-axis coordinates)
    pub fn get_tile<I: Into<TileIndex>>(&self, index: I) -> TileResult<TileView<'_, S>> {
        self.producer().get_tile(&index.into())
    }

    /// Start coordinates of the tile at `index`
    pub fn get_offset<I: Into<TileIndex>>(&self, index: I) -> TileResult<Vec<usize>> {
        self.producer().get_offset(&index.into())
    }

    /// Bounding box of the tile at `index`
    pub fn get_box<I: Into<TileIndex>>(&self, index: I) -> TileResult<RegionBox> {
        self.indexer().get_box(&index.into())
    }

    /// Rescale a materialized array with the raster's quantile bounds
    pub fn normalize(&self, array: ArrayD<f64>, trim: bool) -> TileResult<ArrayD<f64>> {
        self.state.normalizer.normalize(array, trim)
    }
}
