//! Tiling options shared by the commands
//!
//! Builds a `TileConfig` from a TOML file (`--config`) and lets the
//! individual command-line flags override its values.

use clap::ArgMatches;
use log::debug;
use std::str::FromStr;

use crate::errors::{TileError, TileResult};
use crate::tiling::TileConfig;

/// Input file argument
pub fn input_file(args: &ArgMatches) -> TileResult<String> {
    args.get_one::<String>("input")
        .cloned()
        .ok_or_else(|| TileError::GenericError("Missing input file".to_string()))
}

/// Tiling configuration from `--config` and the individual flags
pub fn tile_config(args: &ArgMatches) -> TileResult<TileConfig> {
    let mut config = match args.get_one::<String>("config") {
        Some(path) => {
            debug!("Loading tiling configuration from {}", path);
            TileConfig::from_file(path)?
        }
        None => TileConfig::default(),
    };

    if let Some(axes) = args.get_one::<String>("tile-axes") {
        config.tile_axes = parse_axes(axes)?;
    }
    if let Some(axis) = args.get_one::<String>("channel-axis") {
        config.channel_axis = parse_channel_axis(axis)?;
    }
    if let Some(value) = parse_flag::<f64>(args, "pixel-max")? {
        if !value.is_finite() || value < 0.0 {
            return Err(TileError::ConfigurationError(format!("Invalid pixel-max: {}", value)));
        }
        config.pixel_max = value as u64;
    }
    if let Some(value) = parse_flag::<f64>(args, "overlap")? {
        config.overlap = value;
    }
    if let Some(value) = parse_flag::<f64>(args, "scale-quantile")? {
        config.scale_quantile = value;
    }

    debug!("Tiling configuration: {:?}", config);
    Ok(config)
}

/// Parses a comma-separated axis list such as `1,2` or `-2,-1`
pub fn parse_axes(value: &str) -> TileResult<Vec<isize>> {
    value.split(',')
        .map(|part| {
            part.trim().parse::<isize>().map_err(|_| {
                TileError::ConfigurationError(format!("Invalid axis '{}' in '{}'", part.trim(), value))
            })
        })
        .collect()
}

/// Parses a channel axis; `none` clears one set in the config file
fn parse_channel_axis(value: &str) -> TileResult<Option<isize>> {
    if value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    value.trim().parse::<isize>()
        .map(Some)
        .map_err(|_| TileError::ConfigurationError(format!("Invalid channel axis: {}", value)))
}

fn parse_flag<T: FromStr>(args: &ArgMatches, name: &str) -> TileResult<Option<T>> {
    match args.get_one::<String>(name) {
        Some(raw) => raw.trim().parse::<T>()
            .map(Some)
            .map_err(|_| TileError::ConfigurationError(format!("Invalid value for --{}: {}", name, raw))),
        None => Ok(None),
    }
}
