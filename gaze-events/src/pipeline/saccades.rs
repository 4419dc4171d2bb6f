//! Saccade labeling pass
//!
//! Walks sessions then runs, slices each run with the `start < t <= stop`
//! rule, detects saccades on the degree-converted slice and pairs every
//! event with a `(category, session, run)` label.

use crate::analysis::{extract_saccade_positions, SaccadeDetector, Smoother};
use crate::geometry::{Point, VisualAngle};
use crate::session::{split_xy, SessionRecord};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One detected saccade. Indices are run-local, stop inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaccadeEvent {
    pub start: usize,
    pub stop: usize,
    /// Original-space positions from `start` to `stop`
    pub positions: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaccadeLabel {
    /// Dose category; `None` when the session has no dose
    pub category: Option<usize>,
    /// 1-based session ordinal in input order
    pub session: usize,
    pub run: usize,
}

/// Saccade events and their labels as parallel arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaccadeCollection {
    pub events: Vec<SaccadeEvent>,
    pub labels: Vec<SaccadeLabel>,
}

impl SaccadeCollection {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn push(&mut self, event: SaccadeEvent, label: SaccadeLabel) {
        self.events.push(event);
        self.labels.push(label);
    }

    fn append(&mut self, mut other: SaccadeCollection) {
        self.events.append(&mut other.events);
        self.labels.append(&mut other.labels);
    }

    /// Every event must have exactly one label.
    pub fn check_invariant(&self) -> crate::Result<()> {
        if self.events.len() != self.labels.len() {
            return Err(crate::Error::Invariant(format!(
                "{} saccade events but {} labels",
                self.events.len(),
                self.labels.len()
            )));
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SaccadeEvent, &SaccadeLabel)> {
        self.events.iter().zip(&self.labels)
    }

    /// Number of events labeled with a session ordinal.
    pub fn count_for_session(&self, ordinal: usize) -> usize {
        self.labels.iter().filter(|l| l.session == ordinal).count()
    }
}

fn session_saccades<S: Smoother>(
    record: &SessionRecord,
    ordinal: usize,
    detector: &SaccadeDetector<S>,
    visual_angle: &VisualAngle,
) -> crate::Result<SaccadeCollection> {
    let time_base = record.time_base()?;
    let time_vec = time_base.time_vector(record.trace.len());
    let sampling_rate = time_base.sampling_rate();
    let mut out = SaccadeCollection::default();

    for (run_index, run) in record.meta.runs.iter().enumerate() {
        let positions = &record.trace.positions[run.sample_range(&time_vec)];
        let (x, y) = split_xy(positions);
        let x_deg = visual_angle.pixels_to_degrees(&x);
        let y_deg = visual_angle.pixels_to_degrees(&y);

        let intervals = detector.detect(&x_deg, &y_deg, sampling_rate)?;
        let slices = extract_saccade_positions(positions, &intervals);

        for (interval, positions) in intervals.into_iter().zip(slices) {
            out.push(
                SaccadeEvent {
                    start: interval.start,
                    stop: interval.stop,
                    positions,
                },
                SaccadeLabel {
                    category: record.meta.category,
                    session: ordinal,
                    run: run_index,
                },
            );
        }
    }

    debug!(
        session = %record.meta.session_name,
        ordinal,
        runs = record.meta.num_runs(),
        saccades = out.len(),
        "Detected saccades"
    );
    Ok(out)
}

/// Detect and label saccades across all sessions.
///
/// With `parallel`, sessions run on the rayon pool; results are merged in
/// input order so session ordinals never depend on completion order.
pub fn extract_saccades_with_labels<S: Smoother>(
    sessions: &[SessionRecord],
    detector: &SaccadeDetector<S>,
    visual_angle: &VisualAngle,
    parallel: bool,
) -> crate::Result<SaccadeCollection> {
    let per_session = |(i, record): (usize, &SessionRecord)| {
        session_saccades(record, i + 1, detector, visual_angle)
    };

    let results: Vec<crate::Result<SaccadeCollection>> = if parallel {
        sessions.par_iter().enumerate().map(per_session).collect()
    } else {
        sessions.iter().enumerate().map(per_session).collect()
    };

    let mut all = SaccadeCollection::default();
    for result in results {
        all.append(result?);
    }
    all.check_invariant()?;

    info!(sessions = sessions.len(), saccades = all.len(), "Saccade extraction complete");
    Ok(all)
}
