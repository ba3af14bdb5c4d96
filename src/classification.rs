//! Stop classification.
//!
//! Two independent, read-only views over a run list:
//! - Temporal: split runs around the reaction index into stops made before
//!   the reach started and stops made during or after it
//! - Spatial: keep only the stops whose mean distance from target falls
//!   inside the target radius
//!
//! The spatial view is a filter, not a partition. Runs outside the radius
//! are simply left out.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::Run;

/// Runs split around a reaction index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalPartition {
    /// Runs that end strictly before the reaction index.
    pub before: Vec<Run>,
    /// Every other run, including runs straddling the reaction index.
    pub after: Vec<Run>,
}

/// Split runs into before/after the reaction.
///
/// A run counts as before the reaction only if its last sample precedes it.
pub fn partition_by_reaction(runs: &[Run], reaction: usize) -> TemporalPartition {
    let (before, after): (Vec<Run>, Vec<Run>) =
        runs.iter().copied().partition(|run| run.end < reaction);
    TemporalPartition { before, after }
}

/// Mean of `distance` over the samples of one run.
pub fn mean_run_distance(run: &Run, distance: &[f64]) -> Result<f64> {
    let samples = run.slice(distance)?;
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Runs whose mean distance from target is below `dist_limit`.
pub fn within_target(runs: &[Run], distance: &[f64], dist_limit: f64) -> Result<Vec<Run>> {
    let mut inside = Vec::new();
    for run in runs {
        if mean_run_distance(run, distance)? < dist_limit {
            inside.push(*run);
        }
    }
    Ok(inside)
}
