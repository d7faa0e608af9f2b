//! Tiling parameters
//!
//! `TileConfig` holds what the caller asks for (axes may be negative,
//! nothing is checked yet). `resolve` checks it against a raster shape and
//! produces a `ResolvedConfig` with plain non-negative axes.

use log::debug;
use std::fs;

use crate::errors::{TileError, TileResult};

/// Default tiled axes: the last two
pub const DEFAULT_TILE_AXES: [isize; 2] = [-2, -1];
/// Default maximum element count of the tiled sub-volume
pub const DEFAULT_PIXEL_MAX: u64 = 16_000_000;
/// Default overlap fraction
pub const DEFAULT_OVERLAP: f64 = 0.0;
/// Default quantile used for the lower bound (the upper one is `1 - q`)
pub const DEFAULT_SCALE_QUANTILE: f64 = 0.005;

/// User-facing tiling parameters
#[derive(Debug, Clone, PartialEq)]
pub struct TileConfig {
    /// Axes to tile over; negative values count from the end
    pub tile_axes: Vec<isize>,
    /// Axis holding channels, normalized per channel and never tiled
    pub channel_axis: Option<isize>,
    /// Maximum element count of one tile over the tiled axes
    pub pixel_max: u64,
    /// Fraction of a tile shared with its neighbour, in [0, 1)
    pub overlap: f64,
    /// Lower quantile for normalization bounds, in [0, 0.5)
    pub scale_quantile: f64,
}

impl Default for TileConfig {
    fn default() -> Self {
        TileConfig {
            tile_axes: DEFAULT_TILE_AXES.to_vec(),
            channel_axis: None,
            pixel_max: DEFAULT_PIXEL_MAX,
            overlap: DEFAULT_OVERLAP,
            scale_quantile: DEFAULT_SCALE_QUANTILE,
        }
    }
}

/// Parameters checked against a raster shape
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Tiled axes, non-negative, sorted and deduplicated
    pub tile_axes: Vec<usize>,
    pub channel_axis: Option<usize>,
    pub pixel_max: u64,
    pub overlap: f64,
    pub scale_quantile: f64,
}

impl TileConfig {
    pub fn with_tile_axes(mut self, axes: &[isize]) -> Self {
        self.tile_axes = axes.to_vec();
        self
    }

    pub fn with_channel_axis(mut self, axis: Option<isize>) -> Self {
        self.channel_axis = axis;
        self
    }

    pub fn with_pixel_max(mut self, pixel_max: u64) -> Self {
        self.pixel_max = pixel_max;
        self
    }

    pub fn with_overlap(mut self, overlap: f64) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn with_scale_quantile(mut self, scale_quantile: f64) -> Self {
        self.scale_quantile = scale_quantile;
        self
    }

    /// Parse a configuration from TOML text
    ///
    /// Values are read from a `[tiling]` table; missing keys keep their
    /// defaults and unknown keys are ignored.
    ///
    /// ```toml
    /// [tiling]
    /// tile_axes = [1, 2]
    /// channel_axis = -1
    /// pixel_max = 2500
    /// overlap = 0.25
    /// scale_quantile = 0.01
    /// ```
    pub fn from_toml_str(content: &str) -> TileResult<Self> {
        let toml_value: toml::Value = match content.parse() {
            Ok(value) => value,
            Err(e) => return Err(TileError::ConfigurationError(format!("Failed to parse TOML: {}", e))),
        };

        let mut config = TileConfig::default();
        let table = match toml_value.get("tiling").and_then(|v| v.as_table()) {
            Some(table) => table,
            None => {
                debug!("No [tiling] table, using defaults");
                return Ok(config);
            }
        };

        if let Some(value) = table.get("tile_axes") {
            let items = value.as_array()
                .ok_or_else(|| invalid_key("tile_axes", "an array of integers"))?;
            config.tile_axes = items.iter()
                .map(|v| v.as_integer().map(|i| i as isize))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| invalid_key("tile_axes", "an array of integers"))?;
        }

        if let Some(value) = table.get("channel_axis") {
            let axis = value.as_integer()
                .ok_or_else(|| invalid_key("channel_axis", "an integer"))?;
            config.channel_axis = Some(axis as isize);
        }

        if let Some(value) = table.get("pixel_max") {
            config.pixel_max = parse_pixel_max(value)?;
        }

        if let Some(value) = table.get("overlap") {
            config.overlap = as_number(value).ok_or_else(|| invalid_key("overlap", "a number"))?;
        }

        if let Some(value) = table.get("scale_quantile") {
            config.scale_quantile = as_number(value)
                .ok_or_else(|| invalid_key("scale_quantile", "a number"))?;
        }

        debug!("Loaded tiling configuration: {:?}", config);
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn from_file(path: &str) -> TileResult<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => return Err(TileError::IoError(e)),
        };

        Self::from_toml_str(&contents)
    }

    /// Check the parameters against a raster shape
    ///
    /// Every invalid combination is reported as a `ConfigurationError`;
    /// nothing is clamped.
    pub fn resolve(&self, shape: &[usize]) -> TileResult<ResolvedConfig> {
        let ndim = shape.len();
        if ndim == 0 {
            return Err(TileError::ConfigurationError("raster has no axes".to_string()));
        }
        if let Some(axis) = shape.iter().position(|&n| n == 0) {
            return Err(TileError::ConfigurationError(format!(
                "raster axis {} has length 0 in shape {:?}",
                axis, shape
            )));
        }

        let mut tile_axes = self.tile_axes.iter()
            .map(|&axis| normalize_axis(axis, ndim, "tile axis"))
            .collect::<TileResult<Vec<_>>>()?;
        tile_axes.sort_unstable();
        tile_axes.dedup();
        if tile_axes.len() < 2 {
            return Err(TileError::ConfigurationError(format!(
                "at least 2 distinct tile axes are needed, got {:?}",
                self.tile_axes
            )));
        }

        let channel_axis = self.channel_axis
            .map(|axis| normalize_axis(axis, ndim, "channel axis"))
            .transpose()?;
        if let Some(axis) = channel_axis {
            if tile_axes.contains(&axis) {
                return Err(TileError::ConfigurationError(format!(
                    "channel axis {} is also a tile axis",
                    axis
                )));
            }
        }

        if self.pixel_max < 1 {
            return Err(TileError::ConfigurationError("pixel_max must be at least 1".to_string()));
        }
        if !self.overlap.is_finite() || !(0.0..1.0).contains(&self.overlap) {
            return Err(TileError::ConfigurationError(format!(
                "overlap must be in [0, 1), got {}",
                self.overlap
            )));
        }
        if !self.scale_quantile.is_finite() || !(0.0..0.5).contains(&self.scale_quantile) {
            return Err(TileError::ConfigurationError(format!(
                "scale_quantile must be in [0, 0.5), got {}",
                self.scale_quantile
            )));
        }

        Ok(ResolvedConfig {
            tile_axes,
            channel_axis,
            pixel_max: self.pixel_max,
            overlap: self.overlap,
            scale_quantile: self.scale_quantile,
        })
    }
}

/// Maps a possibly negative axis index into `0..ndim`
pub fn normalize_axis(axis: isize, ndim: usize, what: &str) -> TileResult<usize> {
    let n = ndim as isize;
    if axis < -n || axis >= n {
        return Err(TileError::ConfigurationError(format!(
            "{} {} is out of range for {} axes",
            what, axis, ndim
        )));
    }
    Ok(axis.rem_euclid(n) as usize)
}

fn invalid_key(key: &str, expected: &str) -> TileError {
    TileError::ConfigurationError(format!("tiling.{} must be {}", key, expected))
}

fn as_number(value: &toml::Value) -> Option<f64> {
    value.as_float().or_else(|| value.as_integer().map(|i| i as f64))
}

/// `pixel_max` may be written as an integer or, like `16e6`, as a float
fn parse_pixel_max(value: &toml::Value) -> TileResult<u64> {
    if let Some(i) = value.as_integer() {
        return u64::try_from(i).map_err(|_| invalid_key("pixel_max", "a positive number"));
    }
    match value.as_float() {
        Some(f) if f.is_finite() && f >= 0.0 => Ok(f as u64),
        _ => Err(invalid_key("pixel_max", "a positive number")),
    }
}
