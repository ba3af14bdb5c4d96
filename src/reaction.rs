//! Reaction onset detection.
//!
//! Finds the first sample at which the hand has closed in on the target by
//! at least `min_decrease` distance units compared with `window` samples
//! earlier. This is a first-crossing detector: it reports the earliest
//! sustained decrease, not the point of peak approach speed.
//!
//! Not finding a reaction is a normal outcome (the subject never advanced,
//! or advanced too gradually to cross the delta within one window) and is
//! reported as `None`.

use serde::{Deserialize, Serialize};

/// Parameters for reaction detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionConfig {
    /// Lookback in samples. Typical: 10 (10 ms at 1 kHz).
    ///
    /// Must be at least 1. A zero window compares each sample with itself
    /// and never detects a reaction; `AnalysisConfig::validate` rejects it.
    pub window: usize,

    /// Required drop in distance to target over one window, in distance
    /// units. Typical: 1.0.
    pub min_decrease: f64,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            window: 10,
            min_decrease: 1.0,
        }
    }
}

/// Scans distance-to-target signals for movement onset.
#[derive(Debug, Clone)]
pub struct ReactionDetector {
    config: ReactionConfig,
}

impl ReactionDetector {
    pub fn new(config: ReactionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReactionConfig {
        &self.config
    }

    /// Index of the first `j >= window` with
    /// `distance[j] - distance[j - window] <= -min_decrease`.
    ///
    /// Signals no longer than the window have no candidate index and yield
    /// `None`.
    pub fn detect(&self, distance: &[f64]) -> Option<usize> {
        let window = self.config.window;
        let threshold = -self.config.min_decrease;

        distance
            .windows(window + 1)
            .position(|w| w[window] - w[0] <= threshold)
            .map(|offset| offset + window)
    }
}

impl Default for ReactionDetector {
    fn default() -> Self {
        Self::new(ReactionConfig::default())
    }
}
