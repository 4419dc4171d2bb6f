//! Session data model
//!
//! A session is one recording day: a gaze trace for subject 1, the run
//! boundaries of the behavioral task, dose information, calibration-derived
//! ROIs, and spike-unit timestamps. Metadata is assembled in a fixed order
//! (dose, runs, calibration, sampling rate, category) by the loader.

pub mod metadata;
pub mod dose;
pub mod spikes;

pub use crate::geometry::Point;
pub use dose::{assign_categories, resolve_categories, DoseCategories};
pub use metadata::{Agents, DosePair, RunBoundary, SessionMetadata};
pub use spikes::{SpikeUnit, SpikeUnitLabel};

use crate::geometry::AffineMap;
use crate::time::TimeBase;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Gaze positions of one session with their sampling rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazeTrace {
    pub positions: Vec<Point>,
    pub sampling_rate: f64,
}

impl GazeTrace {
    pub fn new(positions: Vec<Point>, sampling_rate: f64) -> crate::Result<Self> {
        TimeBase::new(sampling_rate)?;
        Ok(Self {
            positions,
            sampling_rate,
        })
    }

    /// Pair separate x and y sequences. They must have equal length.
    pub fn from_xy(x: Vec<f64>, y: Vec<f64>, sampling_rate: f64) -> crate::Result<Self> {
        if x.len() != y.len() {
            return Err(crate::Error::ShapeMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        let positions = x.into_iter().zip(y).map(Point::from).collect();
        Self::new(positions, sampling_rate)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Same trace with every position mapped into calibrated space.
    pub fn mapped(&self, map: &AffineMap) -> Self {
        Self {
            positions: map.apply_all(&self.positions),
            sampling_rate: self.sampling_rate,
        }
    }
}

/// Split positions into separate x and y sequences.
pub fn split_xy(positions: &[Point]) -> (Vec<f64>, Vec<f64>) {
    positions.iter().map(|p| (p.x, p.y)).unzip()
}

/// Everything the detectors need for one session.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub trace: GazeTrace,
    pub meta: SessionMetadata,
    pub spikes: Vec<SpikeUnit>,
}

impl SessionRecord {
    /// Pair a trace with its metadata. The metadata sampling rate is the one
    /// the detectors read; it is set from the trace, and a conflicting value
    /// is replaced.
    pub fn new(trace: GazeTrace, meta: SessionMetadata) -> Self {
        if let Some(rate) = meta.sampling_rate {
            if rate != trace.sampling_rate {
                warn!(
                    session = %meta.session_name,
                    metadata_rate = rate,
                    trace_rate = trace.sampling_rate,
                    "Sampling rate disagrees with gaze trace, using the trace rate"
                );
            }
        }
        let meta = meta.with_sampling_rate(trace.sampling_rate);
        Self {
            trace,
            meta,
            spikes: Vec::new(),
        }
    }

    /// Sampling rate from the session metadata.
    pub fn sampling_rate(&self) -> crate::Result<f64> {
        self.meta
            .sampling_rate
            .ok_or_else(|| crate::Error::MissingMetadata {
                session: self.meta.session_name.clone(),
                what: "sampling rate".to_string(),
            })
    }

    pub fn time_base(&self) -> crate::Result<TimeBase> {
        TimeBase::new(self.sampling_rate()?)
    }

    pub fn with_spikes(mut self, spikes: Vec<SpikeUnit>) -> Self {
        self.spikes = spikes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_xy_shape_mismatch() {
        let err = GazeTrace::from_xy(vec![1.0, 2.0], vec![1.0], 100.0).unwrap_err();
        assert!(matches!(err, crate::Error::ShapeMismatch { x_len: 2, y_len: 1 }));
    }

    #[test]
    fn test_from_xy_pairs_samples() {
        let trace = GazeTrace::from_xy(vec![1.0, 2.0], vec![3.0, 4.0], 100.0).unwrap();
        assert_eq!(trace.positions, vec![Point::new(1.0, 3.0), Point::new(2.0, 4.0)]);
        assert_eq!(trace.len(), 2);
        assert!(!trace.is_empty());
    }

    #[test]
    fn test_invalid_rate_rejected() {
        assert!(GazeTrace::new(vec![], 0.0).is_err());
    }

    #[test]
    fn test_time_vector_matches_length() {
        let trace = GazeTrace::from_xy(vec![0.0; 4], vec![0.0; 4], 2.0).unwrap();
        let record = SessionRecord::new(trace, SessionMetadata::new("s1"));
        let clock = record.time_base().unwrap();
        assert_eq!(clock.time_vector(record.trace.len()), vec![0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_split_xy() {
        let (x, y) = split_xy(&[Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);
        assert_eq!(x, vec![1.0, 3.0]);
        assert_eq!(y, vec![2.0, 4.0]);
    }

    #[test]
    fn test_record_fills_sampling_rate() {
        let trace = GazeTrace::from_xy(vec![0.0], vec![0.0], 500.0).unwrap();
        let record = SessionRecord::new(trace, SessionMetadata::new("s1"));
        assert_eq!(record.meta.sampling_rate, Some(500.0));
        assert_eq!(record.sampling_rate().unwrap(), 500.0);
        assert!(record.spikes.is_empty());
    }

    #[test]
    fn test_record_replaces_conflicting_rate() {
        let trace = GazeTrace::from_xy(vec![0.0], vec![0.0], 500.0).unwrap();
        let record = SessionRecord::new(trace, SessionMetadata::new("s1").with_sampling_rate(250.0));
        assert_eq!(record.meta.sampling_rate, Some(500.0));
        assert_eq!(record.time_base().unwrap().sampling_rate(), 500.0);
    }

    #[test]
    fn test_missing_metadata_rate_is_an_error() {
        let trace = GazeTrace::from_xy(vec![0.0], vec![0.0], 500.0).unwrap();
        let mut record = SessionRecord::new(trace, SessionMetadata::new("s1"));
        record.meta.sampling_rate = None;
        assert!(matches!(
            record.sampling_rate().unwrap_err(),
            crate::Error::MissingMetadata { .. }
        ));
    }

    #[test]
    fn test_mapped_trace() {
        let trace = GazeTrace::from_xy(vec![1.0], vec![1.0], 10.0).unwrap();
        let map = AffineMap {
            matrix: [[2.0, 0.0, 0.0], [0.0, 2.0, 1.0]],
        };
        assert_eq!(trace.mapped(&map).positions, vec![Point::new(2.0, 3.0)]);
    }
}
