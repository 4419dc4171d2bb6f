//! Session Folder Ingest
//!
//! Loads per-session JSON files from a data root. Missing, duplicated, or
//! unparseable metadata files are logged and replaced with empty values so
//! one bad session never aborts the batch.

pub mod session_dir;

pub use session_dir::{discover_sessions, load_all, load_session, FileKind};
