//! Tile statistics command
//!
//! Walks every tile of a file, normalizes it with the file's quantile
//! bounds and reports the minimum, mean and maximum of each tile.

use clap::ArgMatches;
use log::{debug, info};
use ndarray::ArrayD;

use crate::commands::command_traits::Command;
use crate::commands::options;
use crate::errors::TileResult;
use crate::raster::source::RasterSource;
use crate::tiling::{TileConfig, TiledRaster};
use crate::utils::progress::ProgressTracker;

/// Summary of one normalized tile
#[derive(Debug, Clone, PartialEq)]
pub struct TileStats {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    /// Number of non-NaN values
    pub count: usize,
}

impl TileStats {
    /// Statistics over the non-NaN values of `array`
    pub fn from_array(array: &ArrayD<f64>) -> Self {
        let mut stats = TileStats { min: f64::NAN, mean: f64::NAN, max: f64::NAN, count: 0 };
        let mut sum = 0.0;

        for &v in array.iter().filter(|v| !v.is_nan()) {
            stats.min = if stats.count == 0 { v } else { stats.min.min(v) };
            stats.max = if stats.count == 0 { v } else { stats.max.max(v) };
            sum += v;
            stats.count += 1;
        }
        if stats.count > 0 {
            stats.mean = sum / stats.count as f64;
        }

        stats
    }
}

/// Command reporting normalized statistics for every tile
pub struct StatsCommand {
    /// Path to the input file
    input_file: String,
    /// Tiling parameters
    config: TileConfig,
    /// Whether to clip normalized values to [0, 1]
    trim: bool,
}

impl StatsCommand {
    /// Create a new stats command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    pub fn new(args: &ArgMatches) -> TileResult<Self> {
        Ok(StatsCommand {
            input_file: options::input_file(args)?,
            config: options::tile_config(args)?,
            trim: args.get_flag("trim"),
        })
    }

    /// Normalize every tile and summarize it, advancing `progress` per tile
    pub fn collect<S: RasterSource>(
        tiled: &TiledRaster<S>,
        trim: bool,
        progress: &ProgressTracker,
    ) -> TileResult<Vec<(Vec<usize>, TileStats)>> {
        let mut rows = Vec::with_capacity(tiled.len());

        for (i, (tile, offset)) in tiled.split().enumerate() {
            debug!("Reading tile {} at {:?}", i, offset);
            let data = tiled.normalize(tile.read()?, trim)?;
            rows.push((offset, TileStats::from_array(&data)));
            progress.increment(1);
        }

        Ok(rows)
    }
}

impl Command for StatsCommand {
    fn execute(&self) -> TileResult<()> {
        info!("Computing tile statistics for {}", self.input_file);
        let tiled = TiledRaster::open(&self.input_file, self.config.clone())?;

        let progress = ProgressTracker::new(tiled.len() as u64, "Normalizing tiles");
        let rows = Self::collect(&tiled, self.trim, &progress)?;
        progress.finish();

        println!("{:>6}  {:<24} {:>10} {:>10} {:>10}", "tile", "offset", "min", "mean", "max");
        for (i, (offset, stats)) in rows.iter().enumerate() {
            println!(
                "{:>6}  {:<24} {:>10.4} {:>10.4} {:>10.4}",
                i, format!("{:?}", offset), stats.min, stats.mean, stats.max
            );
        }

        Ok(())
    }
}
