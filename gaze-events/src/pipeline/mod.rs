//! Labeling and aggregation
//!
//! Runs the detectors over every session and collects the labeled events
//! into flat, parallel event/label arrays.

pub mod saccades;
pub mod fixations;
pub mod report;

pub use fixations::{extract_fixations_with_labels, FixationCollection, FixationEvent, FixationLabel};
pub use report::{PipelineReport, RunManifest, SessionSummary};
pub use saccades::{extract_saccades_with_labels, SaccadeCollection, SaccadeEvent, SaccadeLabel};

use crate::app::Config;
use crate::session::SessionRecord;

/// Full pass over loaded sessions with the configured detectors.
pub fn run_pipeline(sessions: &[SessionRecord], config: &Config) -> crate::Result<PipelineReport> {
    let parallel = config.pipeline.parallel;
    let saccades = extract_saccades_with_labels(
        sessions,
        &config.saccade.detector(),
        &config.visual_angle,
        parallel,
    )?;

    let fixations = if config.pipeline.skip_fixations {
        None
    } else {
        Some(extract_fixations_with_labels(
            sessions,
            &config.fixation,
            &config.visual_angle,
            parallel,
        )?)
    };

    Ok(PipelineReport::new(sessions, saccades, fixations))
}
