//! Output bundle
//!
//! Writes the labeled collections and per-session summaries of one pipeline
//! pass as JSON into an output directory.

use super::{FixationCollection, SaccadeCollection};
use crate::session::{DosePair, SessionRecord, SpikeUnitLabel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

pub const SACCADES_FILE: &str = "saccades.json";
pub const FIXATIONS_FILE: &str = "fixations.json";
pub const SESSIONS_FILE: &str = "sessions.json";
pub const SPIKE_UNITS_FILE: &str = "spike_units.json";

/// One row of the per-session summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub ordinal: usize,
    pub session_name: String,
    pub category: Option<usize>,
    pub dose: Option<DosePair>,
    pub agent: Option<String>,
    pub num_runs: usize,
    pub num_samples: usize,
    pub sampling_rate: Option<f64>,
    /// Seconds covered by the gaze trace
    pub duration_s: Option<f64>,
    pub saccades: usize,
    pub fixations: usize,
    pub spike_units: usize,
    /// Spikes of all units inside each run window, in run order
    pub spikes_per_run: Vec<usize>,
}

/// Summary file contents, stamped with the pass that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub sessions: Vec<SessionSummary>,
}

/// Everything one pipeline pass produces.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub manifest: RunManifest,
    pub saccades: SaccadeCollection,
    pub fixations: Option<FixationCollection>,
    pub spike_units: Vec<SpikeUnitLabel>,
}

impl PipelineReport {
    pub fn new(
        sessions: &[SessionRecord],
        saccades: SaccadeCollection,
        fixations: Option<FixationCollection>,
    ) -> Self {
        let summaries = sessions
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let ordinal = i + 1;
                SessionSummary {
                    ordinal,
                    session_name: record.meta.session_name.clone(),
                    category: record.meta.category,
                    dose: record.meta.dose,
                    agent: record.meta.agent().map(str::to_string),
                    num_runs: record.meta.num_runs(),
                    num_samples: record.trace.len(),
                    sampling_rate: record.meta.sampling_rate,
                    duration_s: record
                        .time_base()
                        .ok()
                        .map(|tb| tb.duration_of(record.trace.len())),
                    saccades: saccades.count_for_session(ordinal),
                    fixations: fixations
                        .as_ref()
                        .map(|f| f.count_for_session(ordinal))
                        .unwrap_or(0),
                    spike_units: record.spikes.len(),
                    spikes_per_run: spikes_per_run(record),
                }
            })
            .collect();

        let spike_units = sessions
            .iter()
            .flat_map(|r| r.spikes.iter().map(|u| u.label()))
            .collect();

        Self {
            manifest: RunManifest {
                run_id: Uuid::new_v4(),
                created_at: Utc::now(),
                sessions: summaries,
            },
            saccades,
            fixations,
            spike_units,
        }
    }

    /// Write the bundle into `dir`, creating it if needed. Returns the
    /// written paths.
    pub fn write(&self, dir: &Path) -> crate::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        written.push(write_json(dir, SACCADES_FILE, &self.saccades)?);
        if let Some(fixations) = &self.fixations {
            written.push(write_json(dir, FIXATIONS_FILE, fixations)?);
        }
        written.push(write_json(dir, SESSIONS_FILE, &self.manifest)?);
        written.push(write_json(dir, SPIKE_UNITS_FILE, &self.spike_units)?);

        info!(
            run_id = %self.manifest.run_id,
            dir = %dir.display(),
            files = written.len(),
            "Wrote output bundle"
        );
        Ok(written)
    }
}

fn spikes_per_run(record: &SessionRecord) -> Vec<usize> {
    record
        .meta
        .runs
        .iter()
        .map(|run| {
            record
                .spikes
                .iter()
                .map(|u| u.count_in(run.start, run.stop))
                .sum()
        })
        .collect()
}

fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> crate::Result<PathBuf> {
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(&path, json)?;
    Ok(path)
}
