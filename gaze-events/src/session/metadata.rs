//! Session Metadata
//!
//! All fields exist from construction; unknown values are `None` or empty.
//! The loader fills them in a fixed order: dose, runs, calibration,
//! sampling rate, category.

use crate::geometry::{AffineMap, RoiSet};
use crate::time::window_range;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::Range;
use tracing::warn;

/// Oxytocin / naloxone dose combination of a session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DosePair {
    pub ot_dose: f64,
    pub nal_dose: f64,
}

impl DosePair {
    pub const fn new(ot_dose: f64, nal_dose: f64) -> Self {
        Self { ot_dose, nal_dose }
    }
}

// Total order so dose rows can be sorted and deduplicated like matrix rows.
impl Ord for DosePair {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ot_dose
            .total_cmp(&other.ot_dose)
            .then_with(|| self.nal_dose.total_cmp(&other.nal_dose))
    }
}

impl PartialOrd for DosePair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DosePair {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DosePair {}

/// One behavioral run, in the trace's time base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunBoundary {
    pub start: f64,
    pub stop: f64,
}

impl RunBoundary {
    /// A run must start strictly before it stops.
    pub fn new(start: f64, stop: f64) -> crate::Result<Self> {
        Self::checked(0, start, stop)
    }

    fn checked(index: usize, start: f64, stop: f64) -> crate::Result<Self> {
        // Also rejects NaN bounds
        if !(start < stop) {
            return Err(crate::Error::InvalidRun { index, start, stop });
        }
        Ok(Self { start, stop })
    }

    /// Validate an ordered list of `(start, stop)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> crate::Result<Vec<Self>> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, &(start, stop))| Self::checked(i, start, stop))
            .collect()
    }

    /// `start < t <= stop`
    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        t > self.start && t <= self.stop
    }

    /// Sample indices of `time_vec` inside this run.
    pub fn sample_range(&self, time_vec: &[f64]) -> Range<usize> {
        window_range(time_vec, self.start, self.stop)
    }

    pub fn duration(&self) -> f64 {
        self.stop - self.start
    }
}

/// Subject identifiers. The gaze trace belongs to `m1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agents {
    pub m1: Option<String>,
    pub m2: Option<String>,
}

/// Everything known about one session besides its samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub session_name: String,
    pub agents: Agents,
    pub dose: Option<DosePair>,
    pub runs: Vec<RunBoundary>,
    pub rois: Option<RoiSet>,
    /// Raw tracker to calibrated space
    pub space_map: AffineMap,
    pub sampling_rate: Option<f64>,
    /// Dense dose-category id; `None` without dose information
    pub category: Option<usize>,
}

impl SessionMetadata {
    /// Metadata with only the name known.
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            session_name: session_name.into(),
            agents: Agents::default(),
            dose: None,
            runs: Vec::new(),
            rois: None,
            space_map: AffineMap::identity(),
            sampling_rate: None,
            category: None,
        }
    }

    pub fn with_agents(mut self, agents: Agents) -> Self {
        self.agents = agents;
        self
    }

    pub fn with_dose(mut self, dose: DosePair) -> Self {
        self.dose = Some(dose);
        self
    }

    /// Attach run boundaries. Overlapping consecutive runs are kept but
    /// reported; lookups resolve to the first matching run.
    pub fn with_runs(mut self, runs: Vec<RunBoundary>) -> Self {
        for (i, pair) in runs.windows(2).enumerate() {
            if pair[0].stop > pair[1].start {
                warn!(
                    session = %self.session_name,
                    run = i,
                    stop = pair[0].stop,
                    next_start = pair[1].start,
                    "Run overlaps the next run"
                );
            }
        }
        self.runs = runs;
        self
    }

    pub fn with_rois(mut self, rois: RoiSet) -> Self {
        self.rois = Some(rois);
        self
    }

    pub fn with_space_map(mut self, space_map: AffineMap) -> Self {
        self.space_map = space_map;
        self
    }

    pub fn with_sampling_rate(mut self, sampling_rate: f64) -> Self {
        self.sampling_rate = Some(sampling_rate);
        self
    }

    pub fn with_category(mut self, category: Option<usize>) -> Self {
        self.category = category;
        self
    }

    pub fn num_runs(&self) -> usize {
        self.runs.len()
    }

    /// Subject 1 identifier, the owner of the gaze trace.
    pub fn agent(&self) -> Option<&str> {
        self.agents.m1.as_deref()
    }
}
