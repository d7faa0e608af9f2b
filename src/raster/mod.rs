//! Raster access
//!
//! Everything the tiling core needs from pixel storage: the element type,
//! region boxes, the `RasterSource` trait with its lazy `TileView`, and two
//! sources (a memory-mapped TIFF and an in-memory array).

pub mod array_source;
pub mod dtype;
pub mod mapped;
pub mod region;
pub mod source;

pub use array_source::ArraySource;
pub use dtype::DType;
pub use mapped::MappedRaster;
pub use region::RegionBox;
pub use source::{RasterSource, TileView};
