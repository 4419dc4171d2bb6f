//! Event segmentation
//!
//! Turns continuous gaze traces into discrete intervals:
//! - Island finding over boolean masks
//! - Smoothing and numerical differentiation
//! - Velocity-band saccade detection
//! - Fixation classification and labeling

pub mod islands;
pub mod smoothing;
pub mod gradient;
pub mod saccade;
pub mod fixation;

pub use fixation::{Block, FixationClassifier, FixationMethod, FixationParams};
pub use islands::{find_islands, Interval};
pub use saccade::{detect_saccades, extract_saccade_positions, SaccadeDetector};
pub use smoothing::{Smoother, SmoothingKernel};
