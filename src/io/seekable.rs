//! Seekable reader trait
//!
//! Unifies readers that support both reading and seeking, so TIFF
//! structures can be parsed from files and in-memory cursors alike.

use std::io::{Read, Seek};

/// Trait for readers that can both read and seek
pub trait SeekableReader: Read + Seek + Send + Sync {}

// Blanket implementation for any type that implements the required traits
impl<T: Read + Seek + Send + Sync> SeekableReader for T {}
