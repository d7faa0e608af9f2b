//! Quantile normalization
//!
//! Bounds are estimated once from a strided subsample of the whole raster
//! (every `split_factor`-th element along each tiled axis) and then used to
//! rescale tiles to roughly [0, 1]. With a channel axis every channel gets
//! its own bounds.

use log::{debug, info};
use ndarray::{ArrayD, Axis};

use crate::errors::{TileError, TileResult};
use crate::raster::region::RegionBox;
use crate::raster::source::RasterSource;
use crate::tiling::geometry::TileGeometry;

/// Low and high rescaling bounds
#[derive(Debug, Clone, PartialEq)]
pub enum QuantileBounds {
    /// One pair for the whole raster
    Global { low: f64, high: f64 },
    /// One pair per entry of the channel axis
    PerChannel { axis: usize, bounds: Vec<(f64, f64)> },
}

impl QuantileBounds {
    /// Bounds of one channel; for global bounds the channel is ignored
    pub fn channel(&self, channel: usize) -> Option<(f64, f64)> {
        match self {
            QuantileBounds::Global { low, high } => Some((*low, *high)),
            QuantileBounds::PerChannel { bounds, .. } => bounds.get(channel).copied(),
        }
    }
}

/// Rescales arrays with bounds taken from a raster subsample
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    bounds: QuantileBounds,
}

impl Normalizer {
    /// Wrap existing bounds
    pub fn new(bounds: QuantileBounds) -> Self {
        Normalizer { bounds }
    }

    /// Estimate bounds from `source`
    ///
    /// # Arguments
    /// * `source` - Raster to subsample
    /// * `geometry` - Tile geometry of `source`; its split factor is the stride on tiled axes
    /// * `channel_axis` - Axis to compute separate bounds for, if any
    /// * `scale_quantile` - The low bound is this quantile, the high bound `1 - scale_quantile`
    pub fn compute<S: RasterSource + ?Sized>(
        source: &S,
        geometry: &TileGeometry,
        channel_axis: Option<usize>,
        scale_quantile: f64,
    ) -> TileResult<Self> {
        let shape = source.shape();
        let stride = geometry.split_factor();
        let steps: Vec<usize> = (0..shape.len())
            .map(|axis| if geometry.is_tiled(axis) { stride } else { 1 })
            .collect();
        let full = RegionBox::full(shape);

        let bounds = match channel_axis {
            None => {
                let sample = source.read_strided(&full, &steps)?;
                let (low, high) = sample_bounds(sample.iter().copied().collect(), scale_quantile)?;
                info!("Normalization bounds: [{}, {}] (stride {})", low, high, stride);
                QuantileBounds::Global { low, high }
            }
            Some(axis) => {
                let mut bounds = Vec::with_capacity(shape[axis]);
                for channel in 0..shape[axis] {
                    let region = full.clone().with_axis(axis, channel, channel + 1);
                    let sample = source.read_strided(&region, &steps)?;
                    let pair = sample_bounds(sample.iter().copied().collect(), scale_quantile)
                        .map_err(|e| in_channel(e, channel))?;
                    debug!("Channel {} bounds: [{}, {}]", channel, pair.0, pair.1);
                    bounds.push(pair);
                }
                info!("Normalization bounds for {} channels on axis {} (stride {})",
                      bounds.len(), axis, stride);
                QuantileBounds::PerChannel { axis, bounds }
            }
        };

        Ok(Normalizer { bounds })
    }

    pub fn bounds(&self) -> &QuantileBounds {
        &self.bounds
    }

    /// Rescale `array` to `(a - low) / (high - low)`
    ///
    /// Per-channel bounds are applied along their axis of `array`, which
    /// must hold exactly one entry per channel. With `trim` the result is
    /// clipped to [0, 1]. Fails without touching the data when any pair of
    /// bounds is degenerate.
    pub fn normalize(&self, mut array: ArrayD<f64>, trim: bool) -> TileResult<ArrayD<f64>> {
        match &self.bounds {
            QuantileBounds::Global { low, high } => {
                let scale = range(*low, *high)?;
                let low = *low;
                array.mapv_inplace(|v| (v - low) / scale);
            }
            QuantileBounds::PerChannel { axis, bounds } => {
                if *axis >= array.ndim() || array.len_of(Axis(*axis)) != bounds.len() {
                    return Err(TileError::NormalizationError(format!(
                        "array of shape {:?} has no axis {} with {} channels",
                        array.shape(), axis, bounds.len()
                    )));
                }
                let scales = bounds.iter()
                    .enumerate()
                    .map(|(ch, &(low, high))| range(low, high).map_err(|e| in_channel(e, ch)))
                    .collect::<TileResult<Vec<f64>>>()?;

                for (ch, mut lane) in array.axis_iter_mut(Axis(*axis)).enumerate() {
                    let (low, scale) = (bounds[ch].0, scales[ch]);
                    lane.mapv_inplace(|v| (v - low) / scale);
                }
            }
        }

        if trim {
            array.mapv_inplace(|v| v.clamp(0.0, 1.0));
        }

        Ok(array)
    }
}

/// Width of the bounds, rejecting pairs that cannot rescale anything
fn range(low: f64, high: f64) -> TileResult<f64> {
    let scale = high - low;
    if scale > 0.0 && scale.is_finite() {
        Ok(scale)
    } else {
        Err(TileError::NormalizationError(format!(
            "degenerate bounds [{}, {}]",
            low, high
        )))
    }
}

/// Prefixes a normalization error with the channel it concerns
fn in_channel(error: TileError, channel: usize) -> TileError {
    match error {
        TileError::NormalizationError(msg) => {
            TileError::NormalizationError(format!("channel {}: {}", channel, msg))
        }
        other => other,
    }
}

/// `(q, 1 - q)` quantiles of a subsample, ignoring NaN
fn sample_bounds(mut values: Vec<f64>, q: f64) -> TileResult<(f64, f64)> {
    values.retain(|v| !v.is_nan());
    if values.is_empty() {
        return Err(TileError::NormalizationError(
            "subsample holds no finite values".to_string(),
        ));
    }
    values.sort_unstable_by(f64::total_cmp);

    Ok((quantile(&values, q), quantile(&values, 1.0 - q)))
}

/// Linear interpolation between the order statistics of sorted values
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let below = position.floor() as usize;
    let above = position.ceil() as usize;
    let fraction = position - below as f64;

    sorted[below] + (sorted[above] - sorted[below]) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::array_source::ArraySource;
    use crate::tiling::config::TileConfig;
    use crate::tiling::geometry::GeometryResolver;
    use ndarray::{Array, IxDyn};

    fn source_and_geometry(shape: &[usize], values: Vec<f64>, channel: Option<isize>) -> (ArraySource, TileGeometry) {
        let data = Array::from_shape_vec(IxDyn(shape), values).unwrap();
        let config = TileConfig::default()
            .with_tile_axes(&[0, 1])
            .with_channel_axis(channel)
            .with_pixel_max(1_000_000);
        let geometry = GeometryResolver::resolve(shape, &config).unwrap();
        (ArraySource::new(data).unwrap(), geometry)
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let sorted = [0.0, 10.0, 20.0, 30.0, 40.0];
        assert_eq!(quantile(&sorted, 0.0), 0.0);
        assert_eq!(quantile(&sorted, 0.5), 20.0);
        assert_eq!(quantile(&sorted, 1.0), 40.0);
        assert!((quantile(&sorted, 0.1) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn nan_samples_are_ignored() {
        let (low, high) = sample_bounds(vec![f64::NAN, 3.0, 1.0, f64::NAN, 2.0], 0.0).unwrap();
        assert_eq!((low, high), (1.0, 3.0));
        assert!(sample_bounds(vec![f64::NAN], 0.0).is_err());
    }

    #[test]
    fn global_bounds_cover_the_data() {
        let (source, geometry) = source_and_geometry(&[10, 10], (0..100).map(f64::from).collect(), None);
        let normalizer = Normalizer::compute(&source, &geometry, None, 0.0).unwrap();

        assert_eq!(normalizer.bounds(), &QuantileBounds::Global { low: 0.0, high: 99.0 });
    }

    #[test]
    fn per_channel_bounds() {
        // channel 0 ramps 0..50, channel 1 ramps 100..150
        let values: Vec<f64> = (0..50).flat_map(|i| [i as f64, 100.0 + i as f64]).collect();
        let (source, geometry) = source_and_geometry(&[5, 10, 2], values, Some(2));
        let normalizer = Normalizer::compute(&source, &geometry, Some(2), 0.0).unwrap();

        assert_eq!(normalizer.bounds().channel(0), Some((0.0, 49.0)));
        assert_eq!(normalizer.bounds().channel(1), Some((100.0, 149.0)));

        let tile = Array::from_shape_vec(IxDyn(&[1, 1, 2]), vec![49.0, 100.0]).unwrap();
        let scaled = normalizer.normalize(tile, false).unwrap();
        assert_eq!(scaled.as_slice().unwrap(), &[1.0, 0.0]);
    }

    #[test]
    fn trim_clips_and_is_idempotent() {
        let normalizer = Normalizer::new(QuantileBounds::Global { low: 0.0, high: 1.0 });
        let array = Array::from_shape_vec(IxDyn(&[4]), vec![-0.5, 0.25, 0.75, 3.0]).unwrap();

        let once = normalizer.normalize(array, true).unwrap();
        assert_eq!(once.as_slice().unwrap(), &[0.0, 0.25, 0.75, 1.0]);

        let twice = normalizer.normalize(once.clone(), true).unwrap();
        assert_eq!(twice, once);
    }

    #[test]
    fn degenerate_bounds_fail() {
        let normalizer = Normalizer::new(QuantileBounds::Global { low: 2.0, high: 2.0 });
        let array = Array::from_elem(IxDyn(&[3]), 2.0);

        assert!(matches!(normalizer.normalize(array, false), Err(TileError::NormalizationError(_))));
    }

    #[test]
    fn channel_count_must_match() {
        let normalizer = Normalizer::new(QuantileBounds::PerChannel {
            axis: 1,
            bounds: vec![(0.0, 1.0), (0.0, 2.0)],
        });
        let array = Array::from_elem(IxDyn(&[2, 3]), 0.5);

        assert!(matches!(normalizer.normalize(array, false), Err(TileError::NormalizationError(_))));
    }
}
