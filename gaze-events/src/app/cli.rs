//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gaze Events - Segment gaze recordings into labeled saccades and fixations
#[derive(Parser, Debug)]
#[command(name = "gaze-events")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract labeled saccades and fixations from all session folders
    Run {
        /// Directory holding one sub-directory per session
        #[arg(short, long)]
        data_root: PathBuf,

        /// Output directory for the event bundle
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only process these sessions (repeatable)
        #[arg(short, long = "session")]
        sessions: Vec<String>,
    },

    /// Load one session folder and print its resolved metadata
    Inspect {
        /// Session directory
        session_dir: PathBuf,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "saccade.min_samples", "pipeline.parallel")
        key: String,

        /// Value to set
        value: String,
    },

    /// Get a specific configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Default output directory for event bundles
    pub fn output_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".gaze_events").join("output"))
            .unwrap_or_else(|| PathBuf::from("output"))
    }
}
