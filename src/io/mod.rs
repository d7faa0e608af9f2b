//! I/O utilities for file handling
//!
//! Seekable readers and byte order strategies shared by the TIFF parser
//! and the mapped raster.

pub mod seekable;
pub mod byte_order;
