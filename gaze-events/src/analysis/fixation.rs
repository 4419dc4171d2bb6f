//! Fixation Detection and Labeling
//!
//! A whole-session trace is classified sample-by-sample into fixation /
//! non-fixation by a pluggable [`FixationClassifier`]; the fixation islands
//! are then labeled with duration, run/block, and ROI.
//!
//! Block assignment uses the time of the interval's midpoint sample, with
//! the same `start < t <= stop` window rule used to slice runs. Intervals
//! whose first and last samples fall in different blocks are flagged.

use super::gradient::gradient_with_coords;
use super::islands::{find_islands, Interval};
use crate::geometry::{mean_position, Point, RoiKind, RoiSet};
use crate::session::RunBoundary;
use serde::{Deserialize, Serialize};

/// Per-sample fixation classification.
pub trait FixationClassifier: Send + Sync {
    /// `x_deg`/`y_deg` are in degrees of visual angle; `time_vec` holds the
    /// timestamp of every sample.
    fn classify(
        &self,
        x_deg: &[f64],
        y_deg: &[f64],
        time_vec: &[f64],
        sampling_rate: f64,
    ) -> crate::Result<Vec<bool>>;
}

/// Velocity-threshold identification (I-VT).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityClassifier {
    pub max_velocity_deg_s: f64,
}

impl FixationClassifier for VelocityClassifier {
    fn classify(
        &self,
        x_deg: &[f64],
        y_deg: &[f64],
        time_vec: &[f64],
        _sampling_rate: f64,
    ) -> crate::Result<Vec<bool>> {
        check_shapes(x_deg, y_deg, time_vec)?;

        let vx = gradient_with_coords(x_deg, time_vec);
        let vy = gradient_with_coords(y_deg, time_vec);

        Ok(vx
            .iter()
            .zip(&vy)
            .map(|(dx, dy)| {
                let speed = dx.hypot(*dy);
                speed.is_finite() && speed <= self.max_velocity_deg_s
            })
            .collect())
    }
}

/// Dispersion-threshold identification (I-DT).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispersionClassifier {
    /// Maximum `(max x - min x) + (max y - min y)` inside a fixation
    pub max_dispersion_deg: f64,
    /// Shortest window considered a fixation
    pub min_duration_s: f64,
}

impl FixationClassifier for DispersionClassifier {
    fn classify(
        &self,
        x_deg: &[f64],
        y_deg: &[f64],
        time_vec: &[f64],
        sampling_rate: f64,
    ) -> crate::Result<Vec<bool>> {
        check_shapes(x_deg, y_deg, time_vec)?;
        if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
            return Err(crate::Error::InvalidSamplingRate(sampling_rate));
        }

        let n = x_deg.len();
        let window = ((self.min_duration_s * sampling_rate).ceil() as usize).max(1);
        let mut mask = vec![false; n];
        let mut i = 0;

        while i + window <= n {
            let mut extent = Extent::default();
            let mut fits = true;
            for j in i..i + window {
                if !extent.push(x_deg[j], y_deg[j], self.max_dispersion_deg) {
                    fits = false;
                    break;
                }
            }
            if !fits {
                i += 1;
                continue;
            }

            let mut end = i + window;
            while end < n && extent.push(x_deg[end], y_deg[end], self.max_dispersion_deg) {
                end += 1;
            }
            mask[i..end].iter_mut().for_each(|m| *m = true);
            i = end;
        }

        Ok(mask)
    }
}

/// Running bounding box of a candidate fixation window.
#[derive(Debug, Clone, Copy)]
struct Extent {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl Default for Extent {
    fn default() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }
}

impl Extent {
    /// Grow by one sample; `false` (and unchanged) if that breaks the limit.
    fn push(&mut self, x: f64, y: f64, limit: f64) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        let grown = Self {
            min_x: self.min_x.min(x),
            max_x: self.max_x.max(x),
            min_y: self.min_y.min(y),
            max_y: self.max_y.max(y),
        };
        if (grown.max_x - grown.min_x) + (grown.max_y - grown.min_y) <= limit {
            *self = grown;
            true
        } else {
            false
        }
    }
}

fn check_shapes(x: &[f64], y: &[f64], time_vec: &[f64]) -> crate::Result<()> {
    if x.len() != y.len() {
        return Err(crate::Error::ShapeMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    if time_vec.len() != x.len() {
        return Err(crate::Error::Invariant(format!(
            "time vector has {} samples, trace has {}",
            time_vec.len(),
            x.len()
        )));
    }
    Ok(())
}

/// Which fixation rule to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixationMethod {
    Velocity,
    Dispersion,
}

/// Fixation detection settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixationParams {
    pub method: FixationMethod,
    /// I-VT speed ceiling (deg/s)
    pub max_velocity_deg_s: f64,
    /// I-DT dispersion ceiling (deg)
    pub max_dispersion_deg: f64,
    /// I-DT minimum window (s)
    pub min_duration_s: f64,
    /// Minimum fixation island length in samples
    pub min_samples: usize,
}

impl Default for FixationParams {
    fn default() -> Self {
        Self {
            method: FixationMethod::Velocity,
            max_velocity_deg_s: 30.0,
            max_dispersion_deg: 1.0,
            min_duration_s: 0.1,
            min_samples: 1,
        }
    }
}

impl FixationParams {
    pub fn classifier(&self) -> Box<dyn FixationClassifier> {
        match self.method {
            FixationMethod::Velocity => Box::new(VelocityClassifier {
                max_velocity_deg_s: self.max_velocity_deg_s,
            }),
            FixationMethod::Dispersion => Box::new(DispersionClassifier {
                max_dispersion_deg: self.max_dispersion_deg,
                min_duration_s: self.min_duration_s,
            }),
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        let positive = [
            ("max_velocity_deg_s", self.max_velocity_deg_s),
            ("max_dispersion_deg", self.max_dispersion_deg),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(crate::Error::Config(format!(
                    "{} must be > 0, got {}",
                    name, value
                )));
            }
        }
        if !self.min_duration_s.is_finite() || self.min_duration_s < 0.0 {
            return Err(crate::Error::Config(format!(
                "min_duration_s must be >= 0, got {}",
                self.min_duration_s
            )));
        }
        if self.min_samples == 0 {
            return Err(crate::Error::Config("fixation min_samples must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Classify and collect fixation intervals over a whole session.
pub fn detect_fixations(
    classifier: &dyn FixationClassifier,
    x_deg: &[f64],
    y_deg: &[f64],
    time_vec: &[f64],
    sampling_rate: f64,
    min_samples: usize,
) -> crate::Result<Vec<Interval>> {
    let mask = classifier.classify(x_deg, y_deg, time_vec, sampling_rate)?;
    Ok(find_islands(&mask, min_samples))
}

/// Where a time point sits relative to the session's runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    /// The session has no run boundaries
    NoRuns,
    /// At or before the first run start
    PreRun,
    /// Inside run `i`
    Run(usize),
    /// Between run `i` and run `i + 1`
    InterRun(usize),
    /// After the last run stop
    PostRun,
}

impl Block {
    pub fn run_index(&self) -> Option<usize> {
        match self {
            Block::Run(i) => Some(*i),
            _ => None,
        }
    }
}

/// Resolve the block containing time `t`. Overlapping runs resolve to the
/// first matching run.
pub fn resolve_block(t: f64, runs: &[RunBoundary]) -> Block {
    let (first, last) = match (runs.first(), runs.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Block::NoRuns,
    };

    if let Some(i) = runs.iter().position(|r| r.contains(t)) {
        return Block::Run(i);
    }
    if t <= first.start {
        return Block::PreRun;
    }
    if t > last.stop {
        return Block::PostRun;
    }
    runs.windows(2)
        .position(|w| w[0].stop < t && t <= w[1].start)
        .or_else(|| runs.iter().rposition(|r| r.stop < t))
        .map(Block::InterRun)
        .unwrap_or(Block::PreRun)
}

/// Block of a fixation interval plus whether it straddles a boundary.
pub fn resolve_interval_block(interval: Interval, time_vec: &[f64], runs: &[RunBoundary]) -> (Block, bool) {
    let at = |i: usize| time_vec.get(i).copied().unwrap_or(f64::NAN);
    let block = resolve_block(at(interval.midpoint()), runs);
    let spans = resolve_block(at(interval.start), runs) != resolve_block(at(interval.stop), runs);
    (block, spans)
}

/// Duration in seconds, counting both end samples.
pub fn fixation_duration(interval: Interval, sampling_rate: f64) -> f64 {
    interval.len() as f64 / sampling_rate
}

/// ROI containing the interval's mean position.
pub fn find_roi_for_fixation(interval: Interval, positions: &[Point], rois: Option<&RoiSet>) -> Option<RoiKind> {
    let rois = rois?;
    let mean = mean_position(interval.slice(positions)?)?;
    rois.locate(mean)
}
