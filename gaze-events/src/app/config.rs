//! Configuration Management

use crate::analysis::saccade::{DEFAULT_MIN_SAMPLES, DEFAULT_VEL_THRESH};
use crate::analysis::{FixationParams, SaccadeDetector, SmoothingKernel};
use crate::geometry::{RoiConfig, VisualAngle};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Saccade detection settings
    pub saccade: SaccadeConfig,
    /// Fixation classification settings
    pub fixation: FixationParams,
    /// Screen geometry for pixel to degree conversion
    pub visual_angle: VisualAngle,
    /// ROI box sizes around calibration landmarks
    pub roi: RoiConfig,
    /// Pipeline feature toggles
    pub pipeline: PipelineConfig,
}

/// Saccade detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaccadeConfig {
    /// Velocity band `[lo, hi]` of candidate samples
    pub vel_thresh: (f64, f64),
    /// Minimum island length in samples
    pub min_samples: usize,
    /// Kernel applied before differentiation
    pub smoothing: SmoothingKernel,
}

impl Default for SaccadeConfig {
    fn default() -> Self {
        Self {
            vel_thresh: DEFAULT_VEL_THRESH,
            min_samples: DEFAULT_MIN_SAMPLES,
            smoothing: SmoothingKernel::default(),
        }
    }
}

impl SaccadeConfig {
    pub fn detector(&self) -> SaccadeDetector {
        SaccadeDetector::new(self.vel_thresh, self.min_samples, self.smoothing)
    }
}

/// Pipeline feature toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Process sessions on the rayon thread pool
    pub parallel: bool,
    /// Map gaze into calibrated space before detection
    pub map_gaze_to_calibrated_space: bool,
    /// Only extract saccades
    pub skip_fixations: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            map_gaze_to_calibrated_space: false,
            skip_fixations: false,
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        let (lo, hi) = self.saccade.vel_thresh;
        if !lo.is_finite() || !hi.is_finite() || lo < 0.0 {
            return Err(crate::Error::Config(format!(
                "vel_thresh bounds must be finite and >= 0, got [{}, {}]",
                lo, hi
            )));
        }
        if lo > hi {
            return Err(crate::Error::Config(format!(
                "vel_thresh lower bound {} exceeds upper bound {}",
                lo, hi
            )));
        }
        if self.saccade.min_samples == 0 {
            return Err(crate::Error::Config("saccade min_samples must be > 0".to_string()));
        }
        self.saccade.smoothing.validate()?;
        self.fixation.validate()?;
        self.visual_angle.validate()?;
        self.roi.validate()?;
        Ok(())
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save to default location
    pub fn save_default(&self) -> Result<(), crate::Error> {
        self.save(&Self::default_path())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".gaze_events").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }
}
