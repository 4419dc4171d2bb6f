//! Fixation labeling pass
//!
//! Classifies each whole session, then labels every fixation interval with
//! its index, session, category, agent, run/block, ROI and duration.

use crate::analysis::fixation::{
    detect_fixations, find_roi_for_fixation, fixation_duration, resolve_interval_block,
};
use crate::analysis::{Block, FixationClassifier, FixationParams};
use crate::geometry::{mean_position, Point, RoiKind, VisualAngle};
use crate::session::{split_xy, SessionRecord};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One fixation interval within a session. Indices are session-wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixationEvent {
    pub start: usize,
    pub stop: usize,
    pub start_time: f64,
    pub stop_time: f64,
    pub duration_s: f64,
    pub mean_position: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixationLabel {
    /// 0-based position among the session's fixations
    pub index: usize,
    /// 1-based session ordinal in input order
    pub session: usize,
    pub session_name: String,
    pub category: Option<usize>,
    pub agent: Option<String>,
    /// Run index when the fixation lies inside a run
    pub run: Option<usize>,
    pub block: Block,
    pub roi: Option<RoiKind>,
    /// First and last samples resolve to different blocks
    pub spans_boundary: bool,
}

/// Fixation events and their labels as parallel arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixationCollection {
    pub events: Vec<FixationEvent>,
    pub labels: Vec<FixationLabel>,
}

impl FixationCollection {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn append(&mut self, mut other: FixationCollection) {
        self.events.append(&mut other.events);
        self.labels.append(&mut other.labels);
    }

    pub fn check_invariant(&self) -> crate::Result<()> {
        if self.events.len() != self.labels.len() {
            return Err(crate::Error::Invariant(format!(
                "{} fixation events but {} labels",
                self.events.len(),
                self.labels.len()
            )));
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FixationEvent, &FixationLabel)> {
        self.events.iter().zip(&self.labels)
    }

    pub fn count_for_session(&self, ordinal: usize) -> usize {
        self.labels.iter().filter(|l| l.session == ordinal).count()
    }
}

fn session_fixations(
    record: &SessionRecord,
    ordinal: usize,
    classifier: &dyn FixationClassifier,
    min_samples: usize,
    visual_angle: &VisualAngle,
) -> crate::Result<FixationCollection> {
    let time_base = record.time_base()?;
    let time_vec = time_base.time_vector(record.trace.len());
    let sampling_rate = time_base.sampling_rate();
    let positions = &record.trace.positions;

    let (x, y) = split_xy(positions);
    let x_deg = visual_angle.pixels_to_degrees(&x);
    let y_deg = visual_angle.pixels_to_degrees(&y);
    let intervals = detect_fixations(classifier, &x_deg, &y_deg, &time_vec, sampling_rate, min_samples)?;

    let meta = &record.meta;
    let mut out = FixationCollection::default();
    for (index, interval) in intervals.into_iter().enumerate() {
        let (block, spans_boundary) = resolve_interval_block(interval, &time_vec, &meta.runs);
        out.events.push(FixationEvent {
            start: interval.start,
            stop: interval.stop,
            start_time: time_base.sample_time(interval.start),
            stop_time: time_base.sample_time(interval.stop),
            duration_s: fixation_duration(interval, sampling_rate),
            mean_position: interval.slice(positions).and_then(mean_position),
        });
        out.labels.push(FixationLabel {
            index,
            session: ordinal,
            session_name: meta.session_name.clone(),
            category: meta.category,
            agent: meta.agent().map(str::to_string),
            run: block.run_index(),
            block,
            roi: find_roi_for_fixation(interval, positions, meta.rois.as_ref()),
            spans_boundary,
        });
    }

    debug!(
        session = %meta.session_name,
        ordinal,
        fixations = out.len(),
        "Detected fixations"
    );
    Ok(out)
}

/// Classify and label fixations across all sessions, merged in input order.
pub fn extract_fixations_with_labels(
    sessions: &[SessionRecord],
    params: &FixationParams,
    visual_angle: &VisualAngle,
    parallel: bool,
) -> crate::Result<FixationCollection> {
    let classifier = params.classifier();
    let classifier: &dyn FixationClassifier = classifier.as_ref();
    let per_session = |(i, record): (usize, &SessionRecord)| {
        session_fixations(record, i + 1, classifier, params.min_samples, visual_angle)
    };

    let results: Vec<crate::Result<FixationCollection>> = if parallel {
        sessions.par_iter().enumerate().map(per_session).collect()
    } else {
        sessions.iter().enumerate().map(per_session).collect()
    };

    let mut all = FixationCollection::default();
    for result in results {
        all.append(result?);
    }
    all.check_invariant()?;

    info!(sessions = sessions.len(), fixations = all.len(), "Fixation extraction complete");
    Ok(all)
}
