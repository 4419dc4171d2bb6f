//! Velocity-Band Saccade Detection
//!
//! Smooths a degree-converted position trace, differentiates it, and keeps
//! the islands where the velocity norm falls inside a closed band. The
//! returned indices are run-local and are used to slice the original,
//! unsmoothed pixel positions.

use super::gradient::gradient;
use super::islands::{find_islands, Interval};
use super::smoothing::{Smoother, SmoothingKernel};
use crate::geometry::Point;

/// Saccade detector parameterized by its smoothing kernel.
#[derive(Debug, Clone)]
pub struct SaccadeDetector<S = SmoothingKernel> {
    /// Inclusive velocity band `(lo, hi)` marking saccade samples
    pub vel_thresh: (f64, f64),
    /// Minimum island length in samples
    pub min_samples: usize,
    /// Applied to x and y independently before differentiation
    pub smoother: S,
}

impl Default for SaccadeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_VEL_THRESH, DEFAULT_MIN_SAMPLES, SmoothingKernel::default())
    }
}

/// Velocity band in gradient-per-sample divided by the sampling rate.
/// At 1 kHz this corresponds to roughly 30..1000 deg/s.
pub const DEFAULT_VEL_THRESH: (f64, f64) = (3.0e-5, 1.0e-3);

/// Minimum saccade length in samples
pub const DEFAULT_MIN_SAMPLES: usize = 5;

impl<S: Smoother> SaccadeDetector<S> {
    pub fn new(vel_thresh: (f64, f64), min_samples: usize, smoother: S) -> Self {
        Self {
            vel_thresh,
            min_samples,
            smoother,
        }
    }

    /// Per-sample velocity norm: `|gradient(smooth(p))| / sampling_rate`.
    pub fn velocity_norm(&self, x: &[f64], y: &[f64], sampling_rate: f64) -> crate::Result<Vec<f64>> {
        velocity_norm_with(&self.smoother, x, y, sampling_rate)
    }

    /// Start/stop indices (stop inclusive) of every saccade in the trace.
    pub fn detect(&self, x: &[f64], y: &[f64], sampling_rate: f64) -> crate::Result<Vec<Interval>> {
        detect_saccades(x, y, sampling_rate, self.vel_thresh, self.min_samples, &self.smoother)
    }
}

/// Functional form of [`SaccadeDetector::detect`].
pub fn detect_saccades(
    x: &[f64],
    y: &[f64],
    sampling_rate: f64,
    vel_thresh: (f64, f64),
    min_samples: usize,
    smoother: &dyn Smoother,
) -> crate::Result<Vec<Interval>> {
    let norm = velocity_norm_with(smoother, x, y, sampling_rate)?;
    let (lo, hi) = vel_thresh;

    // NaN compares false and never enters the band
    let in_band: Vec<bool> = norm.iter().map(|&v| v >= lo && v <= hi).collect();

    Ok(find_islands(&in_band, min_samples))
}

fn velocity_norm_with(
    smoother: &dyn Smoother,
    x: &[f64],
    y: &[f64],
    sampling_rate: f64,
) -> crate::Result<Vec<f64>> {
    check_inputs(x, y, sampling_rate)?;
    if x.is_empty() {
        return Ok(Vec::new());
    }

    let vx = gradient(&smoother.smooth(x));
    let vy = gradient(&smoother.smooth(y));

    Ok(vx
        .iter()
        .zip(&vy)
        .map(|(dx, dy)| (dx / sampling_rate).hypot(dy / sampling_rate))
        .collect())
}

/// Slice run positions at each interval, stop inclusive.
///
/// Intervals reaching past the run are clipped to it.
pub fn extract_saccade_positions(run_positions: &[Point], intervals: &[Interval]) -> Vec<Vec<Point>> {
    intervals
        .iter()
        .map(|iv| match iv.slice(run_positions) {
            Some(slice) => slice.to_vec(),
            None => run_positions
                .get(iv.start..)
                .map(|s| s.to_vec())
                .unwrap_or_default(),
        })
        .collect()
}

fn check_inputs(x: &[f64], y: &[f64], sampling_rate: f64) -> crate::Result<()> {
    if x.len() != y.len() {
        return Err(crate::Error::ShapeMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
        return Err(crate::Error::InvalidSamplingRate(sampling_rate));
    }
    Ok(())
}
