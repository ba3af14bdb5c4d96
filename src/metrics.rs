//! Stop metrics aggregation.
//!
//! Reduces a run list to the per-bucket numbers reported for each trial:
//! how many stops, how long the hand was stopped, and how far from the
//! target it was while stopped.

use crate::error::Result;
use crate::types::{Run, StopMetrics};

/// Number of stops.
pub fn stop_count(runs: &[Run]) -> usize {
    runs.len()
}

/// Total stopped time in seconds.
///
/// Each run contributes the span from its first to its last sample,
/// `(len - 1) * dt`, so a single-sample run adds nothing.
pub fn total_stop_duration(runs: &[Run], dt: f64) -> f64 {
    runs.iter().map(|run| (run.len() - 1) as f64 * dt).sum()
}

/// Mean distance from target over every sample of every run.
///
/// Samples are pooled across runs, so longer stops weigh more. `None` when
/// there are no runs.
pub fn mean_stop_distance(runs: &[Run], distance: &[f64]) -> Result<Option<f64>> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for run in runs {
        let samples = run.slice(distance)?;
        sum += samples.iter().sum::<f64>();
        count += samples.len();
    }

    Ok((count > 0).then(|| sum / count as f64))
}

impl StopMetrics {
    /// Aggregate a bucket of runs.
    pub fn from_runs(runs: &[Run], distance: &[f64], dt: f64) -> Result<Self> {
        Ok(Self {
            stop_count: stop_count(runs),
            total_duration_s: total_stop_duration(runs, dt),
            mean_distance: mean_stop_distance(runs, distance)?,
        })
    }
}
