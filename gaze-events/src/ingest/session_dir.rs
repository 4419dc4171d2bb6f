//! Session directory layout
//!
//! Each session is one sub-directory of the data root. Inside it, every file
//! kind is recognized by its name suffix and exactly one file per kind is
//! expected.

use crate::app::Config;
use crate::geometry::{AffineMap, CalibrationLandmarks, RoiSet};
use crate::session::{
    assign_categories, Agents, DosePair, GazeTrace, RunBoundary, SessionMetadata, SessionRecord,
    SpikeUnit,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Per-session file kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    MetaInfo,
    Runs,
    Landmarks,
    Gaze,
    SpikeTimes,
}

impl FileKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            FileKind::MetaInfo => "meta_info.json",
            FileKind::Runs => "runs.json",
            FileKind::Landmarks => "landmarks.json",
            FileKind::Gaze => "gaze.json",
            FileKind::SpikeTimes => "spike_ts.json",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            FileKind::MetaInfo => "dose info",
            FileKind::Runs => "run info",
            FileKind::Landmarks => "calibration landmarks",
            FileKind::Gaze => "gaze trace",
            FileKind::SpikeTimes => "spike timestamps",
        }
    }
}

#[derive(Debug, Deserialize)]
struct MetaInfoFile {
    monkey_1: Option<String>,
    monkey_2: Option<String>,
    ot_dose: Option<f64>,
    nal_dose: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RunsFile {
    runs: Vec<RunEntry>,
}

#[derive(Debug, Deserialize)]
struct RunEntry {
    start_s: f64,
    stop_s: f64,
}

#[derive(Debug, Deserialize)]
struct GazeFile {
    sampling_rate: f64,
    x_px: Vec<f64>,
    y_px: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct SpikeFile {
    units: Vec<SpikeEntry>,
}

#[derive(Debug, Deserialize)]
struct SpikeEntry {
    channel: String,
    #[serde(default)]
    channel_label: String,
    unit: u32,
    #[serde(default)]
    unit_label: String,
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    region: String,
    spike_s: Vec<f64>,
    #[serde(default)]
    spike_ms: Vec<f64>,
}

/// Immediate sub-directories of `root`, sorted by name.
pub fn discover_sessions(root: &Path) -> crate::Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn session_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

/// The single file in `dir` whose name ends with the kind's suffix.
fn find_unique(dir: &Path, kind: FileKind, session: &str) -> crate::Result<PathBuf> {
    let mut matches: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .map(|n| n.to_string_lossy().ends_with(kind.suffix()))
                    .unwrap_or(false)
        })
        .collect();

    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => Err(crate::Error::MissingMetadata {
            session: session.to_string(),
            what: format!("no *{} file", kind.suffix()),
        }),
        n => Err(crate::Error::MissingMetadata {
            session: session.to_string(),
            what: format!("{} candidate *{} files", n, kind.suffix()),
        }),
    }
}

fn read_kind<T: DeserializeOwned>(dir: &Path, kind: FileKind, session: &str) -> crate::Result<T> {
    let path = find_unique(dir, kind, session)?;
    let malformed = |reason: String| crate::Error::MalformedRecord {
        session: session.to_string(),
        what: kind.describe().to_string(),
        reason,
    };
    let content = std::fs::read_to_string(&path).map_err(|e| malformed(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| malformed(e.to_string()))
}

/// Log a metadata failure and fall back to the empty value.
fn or_substitute<T>(result: crate::Result<T>, kind: FileKind, session: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(session = %session, kind = kind.describe(), error = %e, "Substituting empty metadata");
            None
        }
    }
}

fn load_runs(dir: &Path, session: &str) -> crate::Result<Vec<RunBoundary>> {
    let file: RunsFile = read_kind(dir, FileKind::Runs, session)?;
    let pairs: Vec<(f64, f64)> = file.runs.iter().map(|r| (r.start_s, r.stop_s)).collect();
    RunBoundary::from_pairs(&pairs).map_err(|e| crate::Error::MalformedRecord {
        session: session.to_string(),
        what: FileKind::Runs.describe().to_string(),
        reason: e.to_string(),
    })
}

fn load_gaze(dir: &Path, session: &str) -> crate::Result<GazeTrace> {
    let file: GazeFile = read_kind(dir, FileKind::Gaze, session)?;
    GazeTrace::from_xy(file.x_px, file.y_px, file.sampling_rate).map_err(|e| {
        crate::Error::MalformedRecord {
            session: session.to_string(),
            what: FileKind::Gaze.describe().to_string(),
            reason: e.to_string(),
        }
    })
}

fn load_spikes(dir: &Path, session: &str) -> crate::Result<Vec<SpikeUnit>> {
    let file: SpikeFile = read_kind(dir, FileKind::SpikeTimes, session)?;
    Ok(file
        .units
        .into_iter()
        .map(|u| {
            let spike_ms = if u.spike_ms.is_empty() {
                u.spike_s.iter().map(|s| s * 1000.0).collect()
            } else {
                u.spike_ms
            };
            SpikeUnit {
                session_name: session.to_string(),
                channel: u.channel,
                channel_label: u.channel_label,
                unit: u.unit,
                unit_label: u.unit_label,
                uuid: u.uuid,
                region: u.region,
                spike_s: u.spike_s,
                spike_ms,
            }
        })
        .collect())
}

/// Load one session folder.
///
/// Metadata is filled in order: dose, runs, calibration, sampling rate.
/// Returns `None` when the gaze trace itself is missing or malformed.
pub fn load_session(dir: &Path, config: &Config) -> Option<SessionRecord> {
    let name = session_name(dir);
    let mut meta = SessionMetadata::new(name.as_str());

    if let Some(info) = or_substitute(
        read_kind::<MetaInfoFile>(dir, FileKind::MetaInfo, &name),
        FileKind::MetaInfo,
        &name,
    ) {
        meta = meta.with_agents(Agents {
            m1: info.monkey_1,
            m2: info.monkey_2,
        });
        match (info.ot_dose, info.nal_dose) {
            (Some(ot), Some(nal)) => meta = meta.with_dose(DosePair::new(ot, nal)),
            _ => warn!(session = %name, "Dose info lacks OT or NAL dose"),
        }
    }

    if let Some(runs) = or_substitute(load_runs(dir, &name), FileKind::Runs, &name) {
        meta = meta.with_runs(runs);
    }

    let landmarks = or_substitute(
        read_kind::<CalibrationLandmarks>(dir, FileKind::Landmarks, &name),
        FileKind::Landmarks,
        &name,
    );
    let space_map = match &landmarks {
        Some(lm) => lm.space_map().unwrap_or_else(|| {
            if !lm.reference_pairs.is_empty() {
                warn!(
                    session = %name,
                    pairs = lm.reference_pairs.len(),
                    "Reference pairs do not determine a space map; using identity"
                );
            }
            AffineMap::identity()
        }),
        None => AffineMap::identity(),
    };
    let map_gaze = config.pipeline.map_gaze_to_calibrated_space;
    if let Some(lm) = &landmarks {
        // ROIs live in the same space as the stored gaze
        let lm = if map_gaze { lm.mapped(&space_map) } else { lm.clone() };
        meta = meta.with_rois(RoiSet::from_landmarks(&lm, &config.roi));
    }
    meta = meta.with_space_map(space_map);

    let trace = match load_gaze(dir, &name) {
        Ok(trace) => trace,
        Err(e) => {
            warn!(session = %name, error = %e, "Skipping session without usable gaze data");
            return None;
        }
    };
    let trace = if map_gaze { trace.mapped(&space_map) } else { trace };

    let spikes = or_substitute(load_spikes(dir, &name), FileKind::SpikeTimes, &name).unwrap_or_default();

    debug!(
        session = %name,
        samples = trace.len(),
        runs = meta.num_runs(),
        spike_units = spikes.len(),
        "Loaded session"
    );
    Some(SessionRecord::new(trace, meta).with_spikes(spikes))
}

/// Load every session under `root` and assign dose categories.
///
/// A non-empty `only` restricts loading to the named sessions.
pub fn load_all(root: &Path, config: &Config, only: &[String]) -> crate::Result<Vec<SessionRecord>> {
    let dirs = discover_sessions(root)?;
    let mut records: Vec<SessionRecord> = dirs
        .iter()
        .filter(|d| only.is_empty() || only.contains(&session_name(d)))
        .filter_map(|d| load_session(d, config))
        .collect();

    let categories = assign_categories(records.iter_mut().map(|r| &mut r.meta));
    info!(
        discovered = dirs.len(),
        loaded = records.len(),
        categories = categories.num_categories(),
        "Loaded sessions"
    );
    Ok(records)
}
