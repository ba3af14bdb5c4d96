//! Complete per-trial stop analysis pipeline.
//!
//! This module wires the stages together for one complete trial:
//! 1. **Stop signal**: pick the thresholded channel (velocity magnitude, or
//!    the rate of change of distance to target) and low-pass it zero-phase
//! 2. **Segmentation**: extract below-threshold runs, drop short ones
//! 3. **Reaction**: find movement onset on the distance channel
//! 4. **Classification**: before/after reaction, within target radius
//! 5. **Aggregation**: metrics for every bucket
//!
//! Each trial is analyzed independently from borrowed channel slices, so a
//! batch can fan out across threads with no coordination. A malformed trial
//! fails on its own and never takes the rest of the batch with it.

use std::borrow::Cow;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classification::{partition_by_reaction, within_target};
use crate::config::{AnalysisConfig, ConfigError, StopSignal};
use crate::error::Result;
use crate::reaction::ReactionDetector;
use crate::segmentation::{extract_runs, filter_short_runs};
use crate::signal::{gradient, ButterworthFilter};
use crate::types::{channel, Run, StopMetrics, Trial};

/// A classified group of stops and its metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopBucket {
    pub runs: Vec<Run>,
    pub metrics: StopMetrics,
}

impl StopBucket {
    fn new(runs: Vec<Run>, distance: &[f64], dt: f64) -> Result<Self> {
        let metrics = StopMetrics::from_runs(&runs, distance, dt)?;
        Ok(Self { runs, metrics })
    }
}

/// Everything derived from one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialAnalysis {
    /// Sample interval used, in seconds.
    pub dt: f64,

    /// Stops that survived the minimum-length filter, in time order.
    pub runs: Vec<Run>,

    /// Below-threshold runs dropped for being too short.
    pub discarded_runs: usize,

    /// Movement onset, if the subject ever closed in on the target.
    pub reaction_index: Option<usize>,

    /// Reaction latency from trial start in seconds.
    pub reaction_time_s: Option<f64>,

    /// Metrics over all stops.
    pub overall: StopMetrics,

    /// Stops ending before the reaction. `None` when there was no reaction
    /// or no stops to classify.
    pub before_reaction: Option<StopBucket>,

    /// Stops ending at or after the reaction. Present whenever
    /// `before_reaction` is.
    pub after_reaction: Option<StopBucket>,

    /// Stops whose mean distance from target is inside the target radius.
    pub within_target: StopBucket,
}

/// Runs the full stop analysis with one fixed configuration.
#[derive(Debug, Clone)]
pub struct StopAnalyzer {
    config: AnalysisConfig,
    reaction_detector: ReactionDetector,
}

impl StopAnalyzer {
    /// Creates an analyzer, validating the configuration first.
    pub fn new(config: AnalysisConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            reaction_detector: ReactionDetector::new(config.reaction.clone()),
            config,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Sample interval used for a trial: the configured override, else the
    /// trial's own.
    pub fn effective_dt(&self, trial: &Trial) -> f64 {
        self.config.dt.unwrap_or_else(|| trial.dt())
    }

    /// The signal thresholded for stops, after optional low-pass filtering.
    ///
    /// Borrows the trial's channel when no transformation is needed.
    pub fn stop_signal<'a>(&self, trial: &'a Trial) -> Result<Cow<'a, [f64]>> {
        let source = trial.channel(self.config.stop_signal.source_channel())?;
        let raw: Cow<'a, [f64]> = match self.config.stop_signal {
            StopSignal::VelocityMagnitude => Cow::Borrowed(source),
            // Per-sample units, matching how `vel_limit` is tuned for this source.
            StopSignal::DistanceRate => Cow::Owned(gradient(source, 1.0)?),
        };

        if !self.config.filter.enabled {
            return Ok(raw);
        }
        let filter = ButterworthFilter::for_interval(&self.config.filter, self.effective_dt(trial))?;
        Ok(Cow::Owned(filter.filtfilt(&raw)?))
    }

    /// Analyze one trial.
    pub fn analyze(&self, trial: &Trial) -> Result<TrialAnalysis> {
        let dt = self.effective_dt(trial);
        let distance = trial.channel(channel::DIST_FROM_TARGET)?;
        let signal = self.stop_signal(trial)?;

        let candidates = extract_runs(&signal, self.config.vel_limit);
        let runs = filter_short_runs(&candidates, self.config.stop_limit);
        let discarded_runs = candidates.len() - runs.len();

        let reaction_index = self.reaction_detector.detect(distance);
        let reaction_time_s = reaction_index.map(|index| index as f64 * dt);

        let overall = StopMetrics::from_runs(&runs, distance, dt)?;

        let (before_reaction, after_reaction) = match reaction_index {
            Some(reaction) if !runs.is_empty() => {
                let partition = partition_by_reaction(&runs, reaction);
                (
                    Some(StopBucket::new(partition.before, distance, dt)?),
                    Some(StopBucket::new(partition.after, distance, dt)?),
                )
            }
            _ => (None, None),
        };

        let within_target = StopBucket::new(
            within_target(&runs, distance, self.config.dist_limit)?,
            distance,
            dt,
        )?;

        debug!(
            samples = trial.len(),
            stops = runs.len(),
            discarded_runs,
            reaction = ?reaction_index,
            within_target = within_target.runs.len(),
            "trial analyzed"
        );

        Ok(TrialAnalysis {
            dt,
            runs,
            discarded_runs,
            reaction_index,
            reaction_time_s,
            overall,
            before_reaction,
            after_reaction,
            within_target,
        })
    }

    /// Analyze trials in parallel.
    ///
    /// Results line up with `trials`; a failing trial only fills its own
    /// slot with an error.
    pub fn analyze_batch(&self, trials: &[Trial]) -> Vec<Result<TrialAnalysis>> {
        let results: Vec<_> = trials.par_iter().map(|trial| self.analyze(trial)).collect();

        let mut failed = 0usize;
        for (index, result) in results.iter().enumerate() {
            if let Err(err) = result {
                failed += 1;
                warn!(trial = index, error = %err, "trial analysis failed");
            }
        }
        info!(trials = trials.len(), failed, "batch analyzed");

        results
    }
}

impl Default for StopAnalyzer {
    fn default() -> Self {
        Self {
            config: AnalysisConfig::default(),
            reaction_detector: ReactionDetector::default(),
        }
    }
}
