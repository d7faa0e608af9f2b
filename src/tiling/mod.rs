//! Tiling core
//!
//! Resolves tiling parameters into a grid over a raster, enumerates the
//! tiles lazily and normalizes their values with quantile bounds.

pub mod config;
pub mod geometry;
pub mod indexer;
pub mod normalizer;
pub mod producer;
pub mod tiled;

pub use config::{ResolvedConfig, TileConfig};
pub use geometry::{AxisTiling, GeometryResolver, TileGeometry};
pub use indexer::{TileIndex, TileIndexer, TileIndices};
pub use normalizer::{Normalizer, QuantileBounds};
pub use producer::TileProducer;
pub use tiled::TiledRaster;
