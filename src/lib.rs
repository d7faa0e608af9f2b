pub mod errors;
pub mod io;
pub mod tiff;
pub mod raster;
pub mod tiling;
pub mod utils;
pub mod commands;

pub use errors::{TileError, TileResult};
pub use raster::{ArraySource, DType, MappedRaster, RasterSource, RegionBox, TileView};
pub use tiff::TiffReader;
pub use tiling::{QuantileBounds, TileConfig, TileIndex, TiledRaster};
