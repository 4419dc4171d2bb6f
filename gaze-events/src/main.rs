//! Gaze Events - batch saccade and fixation segmentation
//!
//! Loads per-session gaze recordings and writes labeled event collections.

use gaze_events::app::cli::{Cli, Commands, ConfigAction};
use gaze_events::app::config::Config;
use gaze_events::ingest::{load_all, load_session};
use gaze_events::pipeline::run_pipeline;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = if cli.config.is_some() {
        Config::load(&config_path)?
    } else {
        Config::load_default()?
    };

    match cli.command {
        Commands::Run {
            data_root,
            output,
            sessions,
        } => {
            run_extract(&data_root, output, &sessions, &config)?;
        }
        Commands::Inspect { session_dir } => {
            run_inspect(&session_dir, &config)?;
        }
        Commands::Init { force } => {
            run_init(force, &config_path)?;
        }
        Commands::Config { action } => {
            run_config(action, &config, &config_path)?;
        }
    }

    Ok(())
}

fn run_extract(
    data_root: &Path,
    output: Option<PathBuf>,
    only: &[String],
    config: &Config,
) -> anyhow::Result<()> {
    if !data_root.is_dir() {
        anyhow::bail!("Data root {:?} is not a directory", data_root);
    }
    info!(data_root = %data_root.display(), "Loading sessions");

    let sessions = load_all(data_root, config, only)?;
    if sessions.is_empty() {
        warn!("No sessions with usable gaze data were found");
    }

    let report = run_pipeline(&sessions, config)?;
    let output_dir = output.unwrap_or_else(Cli::output_dir);
    let written = report.write(&output_dir)?;

    println!("Run {}", report.manifest.run_id);
    for row in &report.manifest.sessions {
        println!(
            "  {:>3}  {:<20} category {:<4} runs {:<3} saccades {:<6} fixations {}",
            row.ordinal,
            row.session_name,
            row.category.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
            row.num_runs,
            row.saccades,
            row.fixations,
        );
    }
    println!(
        "\n{} saccades, {} fixations",
        report.saccades.len(),
        report.fixations.as_ref().map(|f| f.len()).unwrap_or(0)
    );
    for path in written {
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn run_inspect(session_dir: &Path, config: &Config) -> anyhow::Result<()> {
    let record = load_session(session_dir, config).ok_or_else(|| {
        anyhow::anyhow!("Session {:?} has no usable gaze data", session_dir)
    })?;

    println!("{}", serde_json::to_string_pretty(&record.meta)?);
    println!(
        "{} samples at {} Hz, {} spike units",
        record.trace.len(),
        record.sampling_rate()?,
        record.spikes.len()
    );
    Ok(())
}

fn run_init(force: bool, config_path: &PathBuf) -> anyhow::Result<()> {
    if config_path.exists() && !force {
        println!("Config already exists at {:?}", config_path);
        println!("Use --force to overwrite");
        return Ok(());
    }

    Config::default().save(config_path)?;
    info!("Created config at {:?}", config_path);
    println!("Configuration initialized at {:?}", config_path);
    println!("  Output: {:?}", Cli::output_dir());

    Ok(())
}

fn run_config(action: ConfigAction, config: &Config, config_path: &PathBuf) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = config.to_toml()?;
            println!("Configuration ({:?}):\n", config_path);
            println!("{}", toml_str);
        }
        ConfigAction::Get { key } => {
            let toml_str = config.to_toml()?;
            match find_toml_value(&toml_str, &key) {
                Some(v) => println!("{} = {}", key, v),
                None => anyhow::bail!("Configuration key '{}' not found", key),
            }
        }
        ConfigAction::Set { key, value } => {
            if !config_path.exists() {
                anyhow::bail!("No config file found. Run 'gaze-events init' first.");
            }

            let mut toml_content = std::fs::read_to_string(config_path)?;
            if !set_toml_value(&mut toml_content, &key, &value) {
                anyhow::bail!("Failed to set '{}'. Key may not exist in config.", key);
            }

            // Reject edits that no longer parse or validate
            let updated: Config = toml::from_str(&toml_content)?;
            updated.validate()?;
            std::fs::write(config_path, &toml_content)?;
            println!("Set {} = {}", key, value);
        }
        ConfigAction::Reset { force } => {
            if config_path.exists() && !force {
                println!("Config exists at {:?}", config_path);
                println!("Use --force to reset to defaults");
                return Ok(());
            }

            Config::default().save(config_path)?;
            println!("Configuration reset to defaults at {:?}", config_path);
        }
    }

    Ok(())
}

/// Split `a.b.c` into section `a.b` and leaf `c`.
fn split_key(key: &str) -> (&str, &str) {
    match key.rsplit_once('.') {
        Some((section, leaf)) => (section, leaf),
        None => ("", key),
    }
}

/// Simple TOML value lookup by dotted key
fn find_toml_value<'a>(toml_str: &'a str, key: &str) -> Option<&'a str> {
    let (section_name, leaf_key) = split_key(key);
    let mut in_section = section_name.is_empty();

    for line in toml_str.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            in_section = &trimmed[1..trimmed.len() - 1] == section_name;
            continue;
        }

        if in_section {
            if let Some(eq_pos) = trimmed.find('=') {
                if trimmed[..eq_pos].trim() == leaf_key {
                    return Some(trimmed[eq_pos + 1..].trim());
                }
            }
        }
    }

    None
}

/// Simple TOML value setter by dotted key
fn set_toml_value(toml_str: &mut String, key: &str, value: &str) -> bool {
    let (section_name, leaf_key) = split_key(key);
    let mut in_section = section_name.is_empty();
    let mut found = false;

    let mut new_lines = Vec::new();
    for line in toml_str.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            in_section = &trimmed[1..trimmed.len() - 1] == section_name;
        }

        if in_section && !found {
            if let Some(eq_pos) = trimmed.find('=') {
                if trimmed[..eq_pos].trim() == leaf_key {
                    new_lines.push(format!("{} = {}", leaf_key, value));
                    found = true;
                    continue;
                }
            }
        }

        new_lines.push(line.to_string());
    }

    if found {
        *toml_str = new_lines.join("\n");
        if !toml_str.ends_with('\n') {
            toml_str.push('\n');
        }
    }

    found
}
