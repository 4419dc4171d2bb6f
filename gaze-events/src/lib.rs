//! # Gaze Events
//!
//! A batch pipeline that turns per-session gaze recordings into labeled,
//! analysis-ready saccade and fixation events.
//!
//! ## Overview
//!
//! Each session contributes a continuous 2D gaze trace (pixels), a sampling
//! rate, the start/stop times of its behavioral runs, optional calibration
//! landmarks and spike-unit timestamps. The pipeline:
//!
//! 1. assigns every session a dose category from its (OT, NAL) dose pair,
//! 2. slices the trace into runs and detects saccades per run,
//! 3. classifies the whole session into fixation intervals and labels each
//!    with its run/block, ROI, duration and agent.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gaze_events::analysis::{SaccadeDetector, SmoothingKernel};
//! use gaze_events::pipeline::extract_saccades_with_labels;
//! use gaze_events::session::{GazeTrace, SessionMetadata, SessionRecord, RunBoundary};
//! use gaze_events::geometry::VisualAngle;
//!
//! let trace = GazeTrace::from_xy(vec![0.0; 100], vec![0.0; 100], 1000.0).unwrap();
//! let meta = SessionMetadata::new("session_01")
//!     .with_runs(vec![RunBoundary::new(0.0, 0.05).unwrap()])
//!     .with_sampling_rate(1000.0)
//!     .with_category(Some(0));
//! let sessions = vec![SessionRecord::new(trace, meta)];
//!
//! let detector = SaccadeDetector::new((0.5, 1000.0), 2, SmoothingKernel::Identity);
//! let saccades = extract_saccades_with_labels(&sessions, &detector, &VisualAngle::default(), false)
//!     .expect("invariant holds");
//! assert_eq!(saccades.events.len(), saccades.labels.len());
//! ```
//!
//! ## Architecture
//!
//! - [`time`]: time vectors and run windows
//! - [`geometry`]: visual-angle conversion, calibrated-space mapping, ROIs
//! - [`analysis`]: island finding, smoothing, saccade and fixation detection
//! - [`session`]: session metadata, dose categories, spike units
//! - [`ingest`]: session-folder loading with warn-and-substitute semantics
//! - [`pipeline`]: labeling/aggregation across sessions and runs
//! - [`app`]: CLI and configuration management
//!
//! ## Event Pipeline
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Session   │───▶│    Dose     │───▶│  Run slices │
//! │   folders   │    │  categories │    │ (t0 < t<=t1)│
//! └─────────────┘    └─────────────┘    └─────────────┘
//!                                              │
//!                          ┌───────────────────┴───────────────┐
//!                          ▼                                   ▼
//!                   ┌─────────────┐                     ┌─────────────┐
//!                   │  Saccades   │                     │  Fixations  │
//!                   │ + labels    │                     │ + labels    │
//!                   └─────────────┘                     └─────────────┘
//! ```

pub mod time;
pub mod geometry;
pub mod analysis;
pub mod session;
pub mod ingest;
pub mod pipeline;
pub mod app;

// Re-export commonly used types
pub use analysis::{find_islands, Interval, SaccadeDetector};
pub use session::{GazeTrace, Point, RunBoundary, SessionMetadata, SessionRecord};
pub use pipeline::{FixationCollection, SaccadeCollection};

/// Result type alias for the gaze event pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the gaze event pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Shape mismatch: x has {x_len} samples, y has {y_len}")]
    ShapeMismatch { x_len: usize, y_len: usize },

    #[error("Invalid sampling rate: {0}")]
    InvalidSamplingRate(f64),

    #[error("Invalid run {index}: start {start} must be before stop {stop}")]
    InvalidRun { index: usize, start: f64, stop: f64 },

    #[error("Missing metadata for session '{session}': {what}")]
    MissingMetadata { session: String, what: String },

    #[error("Malformed {what} for session '{session}': {reason}")]
    MalformedRecord {
        session: String,
        what: String,
        reason: String,
    },

    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
