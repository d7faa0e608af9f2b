//! Tiling plan command
//!
//! Opens a TIFF, resolves the tiling and prints the grid: raster shape and
//! dtype, per-axis extent/step/count, normalization bounds and the box of
//! every tile.

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::commands::options;
use crate::errors::TileResult;
use crate::raster::RasterSource;
use crate::tiling::{QuantileBounds, TileConfig, TiledRaster};

/// Command printing the tile grid of a file
pub struct PlanCommand {
    /// Path to the input file
    input_file: String,
    /// Tiling parameters
    config: TileConfig,
    /// Whether to list every tile
    verbose: bool,
}

impl PlanCommand {
    /// Create a new plan command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    pub fn new(args: &ArgMatches) -> TileResult<Self> {
        Ok(PlanCommand {
            input_file: options::input_file(args)?,
            config: options::tile_config(args)?,
            verbose: args.get_flag("verbose"),
        })
    }

    /// Render the plan as text lines
    pub fn render<S: RasterSource>(tiled: &TiledRaster<S>, list_tiles: bool) -> Vec<String> {
        let mut lines = Vec::new();
        let geometry = tiled.geometry();

        lines.push(format!("Shape: {:?} ({})", tiled.shape(), tiled.source().dtype()));
        for axis in geometry.axes() {
            lines.push(format!(
                "  Axis {}: extent {}, step {}, {} tiles",
                axis.axis, axis.extent, axis.step, axis.count
            ));
        }
        lines.push(format!("Tiles: {} (split factor {})", tiled.len(), tiled.split_factor()));

        match tiled.bounds() {
            QuantileBounds::Global { low, high } => {
                lines.push(format!("Bounds: [{}, {}]", low, high));
            }
            QuantileBounds::PerChannel { axis, bounds } => {
                lines.push(format!("Bounds per channel (axis {}):", axis));
                for (ch, (low, high)) in bounds.iter().enumerate() {
                    lines.push(format!("  Channel {}: [{}, {}]", ch, low, high));
                }
            }
        }

        if list_tiles {
            for (i, (tile, _)) in tiled.split().enumerate() {
                lines.push(format!("  Tile {}: {}", i, tile.region()));
            }
        }

        lines
    }
}

impl Command for PlanCommand {
    fn execute(&self) -> TileResult<()> {
        info!("Planning tiles for {}", self.input_file);
        let tiled = TiledRaster::open(&self.input_file, self.config.clone())?;

        for line in Self::render(&tiled, self.verbose || tiled.len() <= 64) {
            println!("{}", line);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::ArraySource;
    use ndarray::{Array, IxDyn};

    #[test]
    fn renders_geometry_and_tiles() {
        let data = Array::from_shape_vec(IxDyn(&[4, 6]), (0..24).map(f64::from).collect()).unwrap();
        let config = TileConfig::default().with_pixel_max(9);
        let tiled = TiledRaster::new(ArraySource::new(data).unwrap(), config).unwrap();

        let lines = PlanCommand::render(&tiled, true);

        assert_eq!(lines[0], "Shape: [4, 6] (float64)");
        assert_eq!(lines[1], "  Axis 0: extent 3, step 3, 2 tiles");
        assert_eq!(lines[3], "Tiles: 4 (split factor 2)");
        assert_eq!(lines.last().unwrap(), "  Tile 3: [3:4, 3:6]");
    }
}
