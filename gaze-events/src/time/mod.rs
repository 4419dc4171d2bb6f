//! Sample-clock timing for gaze traces
//!
//! Every trace is sampled at a fixed rate, so sample `i` sits at
//! `i / sampling_rate` seconds. Run boundaries are expressed in the same
//! time base and select samples with a left-exclusive, right-inclusive rule.

pub mod timebase;

pub use timebase::{build_time_vector, window_range, TimeBase};
