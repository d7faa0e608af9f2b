//! Lazy tile production
//!
//! Pairs the indexer with a raster source. Every iterator walks the tile
//! indices once and builds views on demand; nothing is read until the
//! caller reads a view.

use log::debug;

use crate::errors::TileResult;
use crate::raster::source::{RasterSource, TileView};
use crate::tiling::indexer::{TileIndex, TileIndexer};

/// Produces tile views and offsets over a raster source
pub struct TileProducer<'a, S: RasterSource + ?Sized> {
    source: &'a S,
    indexer: TileIndexer<'a>,
}

impl<'a, S: RasterSource + ?Sized> TileProducer<'a, S> {
    pub fn new(source: &'a S, indexer: TileIndexer<'a>) -> Self {
        TileProducer { source, indexer }
    }

    /// Number of tiles every iterator yields
    pub fn len(&self) -> usize {
        self.indexer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexer.is_empty()
    }

    /// Every tile view, in index order
    pub fn tiles(&self) -> impl ExactSizeIterator<Item = TileView<'a, S>> + 'a {
        self.split().map(|(view, _)| view)
    }

    /// Start coordinates of every tile, in index order
    pub fn offsets(&self) -> impl ExactSizeIterator<Item = Vec<usize>> + 'a {
        self.split().map(|(_, offset)| offset)
    }

    /// `(view, offset)` for every tile, from a single pass over the indices
    pub fn split(&self) -> impl ExactSizeIterator<Item = (TileView<'a, S>, Vec<usize>)> + 'a {
        let source = self.source;
        let indexer = self.indexer;

        indexer.indices().map(move |coords| {
            let region = indexer.box_for(&coords);
            debug!("Tile {:?} -> {}", coords, region);
            let offset = region.start().to_vec();
            (TileView::new(source, region), offset)
        })
    }

    /// View of a single tile
    pub fn get_tile(&self, index: &TileIndex) -> TileResult<TileView<'a, S>> {
        let region = self.indexer.get_box(index)?;
        Ok(TileView::new(self.source, region))
    }

    /// Start coordinates of a single tile
    pub fn get_offset(&self, index: &TileIndex) -> TileResult<Vec<usize>> {
        Ok(self.indexer.get_box(index)?.start().to_vec())
    }
}
