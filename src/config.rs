//! Analysis configuration.
//!
//! All tuning values for one analysis run live in `AnalysisConfig`, which is
//! passed into the analyzer explicitly. Sweeping a parameter means building
//! several configs, never touching shared state.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reaction::ReactionConfig;
use crate::signal::FilterConfig;
use crate::types::channel;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Which channel is thresholded to find stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopSignal {
    /// Hand speed as reported by the robot (`Vxy_Mag`).
    #[default]
    VelocityMagnitude,
    /// Per-sample rate of change of `Dist_From_Target`.
    DistanceRate,
}

impl StopSignal {
    /// Channel the stop signal is derived from.
    pub fn source_channel(&self) -> &'static str {
        match self {
            StopSignal::VelocityMagnitude => channel::VXY_MAG,
            StopSignal::DistanceRate => channel::DIST_FROM_TARGET,
        }
    }
}

/// Tuning values for stop analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Samples with `|signal| < vel_limit` count as stopped.
    /// Typical: 0.0025, just above the robot's resting noise.
    pub vel_limit: f64,

    /// Minimum stop length in samples. Shorter runs are dropped.
    pub stop_limit: usize,

    /// Target radius in distance units. Stops with a mean distance below
    /// this are reported as within target.
    pub dist_limit: f64,

    /// Sample interval override in seconds. `None` uses each trial's own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dt: Option<f64>,

    /// Channel thresholded for stops.
    pub stop_signal: StopSignal,

    /// Low-pass stage applied to the stop signal.
    pub filter: FilterConfig,

    /// Reaction onset detection.
    pub reaction: ReactionConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            vel_limit: 0.0025,
            stop_limit: 11,
            dist_limit: 10.0,
            dt: None,
            stop_signal: StopSignal::default(),
            filter: FilterConfig::default(),
            reaction: ReactionConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate a TOML document. Missing keys take defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values that make the analysis meaningless.
    ///
    /// The cutoff-versus-Nyquist check depends on each trial's sample
    /// interval and happens at analysis time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.vel_limit.is_finite() && self.vel_limit > 0.0) {
            return Err(ConfigError::Validation(format!(
                "vel_limit must be positive, got {}",
                self.vel_limit
            )));
        }
        if self.stop_limit == 0 {
            return Err(ConfigError::Validation("stop_limit must be at least 1".into()));
        }
        if !(self.dist_limit.is_finite() && self.dist_limit > 0.0) {
            return Err(ConfigError::Validation(format!(
                "dist_limit must be positive, got {}",
                self.dist_limit
            )));
        }
        if let Some(dt) = self.dt {
            if !(dt.is_finite() && dt > 0.0) {
                return Err(ConfigError::Validation(format!("dt must be positive, got {dt}")));
            }
        }
        if self.filter.enabled && !(self.filter.cutoff_hz.is_finite() && self.filter.cutoff_hz > 0.0) {
            return Err(ConfigError::Validation(format!(
                "filter.cutoff_hz must be positive, got {}",
                self.filter.cutoff_hz
            )));
        }
        if self.reaction.window == 0 {
            return Err(ConfigError::Validation("reaction.window must be at least 1".into()));
        }
        if !(self.reaction.min_decrease.is_finite() && self.reaction.min_decrease > 0.0) {
            return Err(ConfigError::Validation(format!(
                "reaction.min_decrease must be positive, got {}",
                self.reaction.min_decrease
            )));
        }
        Ok(())
    }
}
