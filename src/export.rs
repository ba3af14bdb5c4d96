//! Report export for plotting and downstream statistics.
//!
//! This module packages analysis results as JSON:
//! - **TrialReport**: one trial's runs, their time spans (for shading stop
//!   intervals on a time axis) and every metric bucket
//! - **BatchReport**: all trial reports of a run, the failures, the config
//!   used, and a session summary
//!
//! The format is self-contained: a report carries the config it was
//! produced with, so figures can be annotated without the original inputs.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::pipeline::TrialAnalysis;
use crate::types::{RunSpan, Trial};

/// One analyzed trial, ready for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialReport {
    pub trial_id: String,
    pub samples: usize,
    /// Time bounds of each entry of `analysis.runs`, in seconds.
    pub spans: Vec<RunSpan>,
    #[serde(flatten)]
    pub analysis: TrialAnalysis,
}

impl TrialReport {
    /// Spans use the interval the analysis ran with, so they agree with the
    /// reported durations when `dt` was overridden.
    pub fn new(trial_id: impl Into<String>, trial: &Trial, analysis: TrialAnalysis) -> Result<Self> {
        Ok(Self {
            trial_id: trial_id.into(),
            samples: trial.len(),
            spans: trial.run_spans_with_dt(&analysis.runs, analysis.dt)?,
            analysis,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// A trial that could not be analyzed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialFailure {
    pub trial_id: String,
    pub error: String,
}

/// Session-level statistics over the successfully analyzed trials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub analyzed_trials: usize,
    pub failed_trials: usize,
    pub total_stops: usize,
    pub total_stop_duration_s: f64,
    pub trials_with_reaction: usize,
    /// Mean reaction latency over trials with a reaction.
    pub mean_reaction_time_s: Option<f64>,
    pub stops_within_target: usize,
}

impl SessionSummary {
    fn from_reports(reports: &[TrialReport], failed_trials: usize) -> Self {
        let reaction_times: Vec<f64> = reports
            .iter()
            .filter_map(|r| r.analysis.reaction_time_s)
            .collect();
        let mean_reaction_time_s = (!reaction_times.is_empty())
            .then(|| reaction_times.iter().sum::<f64>() / reaction_times.len() as f64);

        Self {
            analyzed_trials: reports.len(),
            failed_trials,
            total_stops: reports.iter().map(|r| r.analysis.overall.stop_count).sum(),
            total_stop_duration_s: reports
                .iter()
                .map(|r| r.analysis.overall.total_duration_s)
                .sum(),
            trials_with_reaction: reaction_times.len(),
            mean_reaction_time_s,
            stops_within_target: reports
                .iter()
                .map(|r| r.analysis.within_target.metrics.stop_count)
                .sum(),
        }
    }
}

/// Results of analyzing a batch of trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub config: AnalysisConfig,
    pub summary: SessionSummary,
    pub trials: Vec<TrialReport>,
    pub failures: Vec<TrialFailure>,
}

impl BatchReport {
    /// Pair trials with their results.
    ///
    /// `ids`, `trials` and `results` must line up index for index, as
    /// returned by `StopAnalyzer::analyze_batch`.
    pub fn collect(
        config: &AnalysisConfig,
        ids: &[String],
        trials: &[Trial],
        results: Vec<Result<TrialAnalysis>>,
    ) -> Self {
        let mut reports = Vec::new();
        let mut failures = Vec::new();

        for ((id, trial), result) in ids.iter().zip(trials).zip(results) {
            match result.and_then(|analysis| TrialReport::new(id.clone(), trial, analysis)) {
                Ok(report) => reports.push(report),
                Err(err) => failures.push(TrialFailure {
                    trial_id: id.clone(),
                    error: err.to_string(),
                }),
            }
        }

        Self {
            config: config.clone(),
            summary: SessionSummary::from_reports(&reports, failures.len()),
            trials: reports,
            failures,
        }
    }

    /// Record a trial that failed before analysis, e.g. while loading.
    pub fn record_failure(&mut self, trial_id: impl Into<String>, error: &AnalysisError) {
        self.failures.push(TrialFailure {
            trial_id: trial_id.into(),
            error: error.to_string(),
        });
        self.summary.failed_trials = self.failures.len();
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::StopAnalyzer;
    use crate::signal::FilterConfig;
    use crate::types::Run;

    fn stopping_trial() -> Trial {
        let mut velocity = vec![1.0; 40];
        for v in &mut velocity[10..25] {
            *v = 0.0;
        }
        let distance: Vec<f64> = (0..40).map(|i| 40.0 - i as f64 * 0.5).collect();
        let time: Vec<f64> = (0..40).map(|i| 2.0 + i as f64 * 0.001).collect();
        Trial::from_columns(
            vec![("Time", time), ("Vxy_Mag", velocity), ("Dist_From_Target", distance)],
            0.001,
        )
        .unwrap()
    }

    fn analyzer() -> StopAnalyzer {
        StopAnalyzer::new(AnalysisConfig {
            filter: FilterConfig {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_trial_report_spans_use_time_channel() {
        let trial = stopping_trial();
        let analysis = analyzer().analyze(&trial).unwrap();
        assert_eq!(analysis.runs, vec![Run::new(10, 24)]);

        let report = TrialReport::new("P01_T1_0", &trial, analysis).unwrap();
        assert_eq!(report.samples, 40);
        assert_eq!(report.spans.len(), 1);
        assert!((report.spans[0].start_s - 2.010).abs() < 1e-9);
        assert!((report.spans[0].end_s - 2.024).abs() < 1e-9);
    }

    #[test]
    fn test_spans_follow_dt_override() {
        // No Time channel: spans come from index * dt.
        let mut velocity = vec![1.0; 40];
        velocity[10..25].fill(0.0);
        let trial = Trial::from_columns(
            vec![("Vxy_Mag", velocity), ("Dist_From_Target", vec![20.0; 40])],
            0.001,
        )
        .unwrap();
        let analyzer = StopAnalyzer::new(AnalysisConfig {
            dt: Some(0.01),
            filter: FilterConfig {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap();

        let report = TrialReport::new("t", &trial, analyzer.analyze(&trial).unwrap()).unwrap();
        let span = report.spans[0];
        let duration = report.analysis.overall.total_duration_s;

        assert!((span.start_s - 0.10).abs() < 1e-9);
        assert!((span.end_s - 0.24).abs() < 1e-9);
        assert!((duration - (span.end_s - span.start_s)).abs() < 1e-9);
    }

    #[test]
    fn test_trial_report_json_is_flat() {
        let trial = stopping_trial();
        let analysis = analyzer().analyze(&trial).unwrap();
        let report = TrialReport::new("P01_T1_0", &trial, analysis).unwrap();

        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["trial_id"], "P01_T1_0");
        assert_eq!(value["runs"][0]["start"], 10);
        assert_eq!(value["runs"][0]["end"], 24);
        assert_eq!(value["overall"]["stop_count"], 1);
        assert!(value["reaction_index"].is_number());
    }

    #[test]
    fn test_empty_bucket_serializes_null_mean() {
        let trial = stopping_trial();
        let analysis = analyzer().analyze(&trial).unwrap();
        let report = TrialReport::new("t", &trial, analysis).unwrap();

        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        // The stop sits 28-35 units out, outside the default 10-unit radius.
        assert_eq!(value["within_target"]["metrics"]["stop_count"], 0);
        assert!(value["within_target"]["metrics"]["mean_distance"].is_null());
    }

    #[test]
    fn test_batch_report_collects_failures() {
        let good = stopping_trial();
        let bad = Trial::from_columns(vec![("Vxy_Mag", vec![0.0; 40])], 0.001).unwrap();
        let trials = vec![good, bad];
        let ids = vec!["good".to_string(), "bad".to_string()];

        let analyzer = analyzer();
        let results = analyzer.analyze_batch(&trials);
        let batch = BatchReport::collect(analyzer.config(), &ids, &trials, results);

        assert_eq!(batch.trials.len(), 1);
        assert_eq!(batch.trials[0].trial_id, "good");
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].trial_id, "bad");
        assert_eq!(
            batch.failures[0].error,
            AnalysisError::MissingChannel("Dist_From_Target".into()).to_string()
        );
        assert_eq!(batch.summary.analyzed_trials, 1);
        assert_eq!(batch.summary.failed_trials, 1);
        assert_eq!(batch.summary.total_stops, 1);
    }

    #[test]
    fn test_batch_report_parses_back() {
        let trials = vec![stopping_trial()];
        let ids = vec!["only".to_string()];
        let analyzer = analyzer();
        let batch = BatchReport::collect(
            analyzer.config(),
            &ids,
            &trials,
            analyzer.analyze_batch(&trials),
        );

        let parsed: BatchReport = serde_json::from_str(&batch.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed.config, batch.config);
        assert_eq!(parsed.trials.len(), 1);
        assert_eq!(parsed.trials[0].trial_id, "only");
        assert_eq!(parsed.trials[0].analysis.runs, batch.trials[0].analysis.runs);
        assert_eq!(parsed.summary.total_stops, batch.summary.total_stops);
    }

    #[test]
    fn test_record_failure_updates_summary() {
        let trials = vec![stopping_trial()];
        let ids = vec!["ok".to_string()];
        let analyzer = analyzer();
        let mut batch = BatchReport::collect(
            analyzer.config(),
            &ids,
            &trials,
            analyzer.analyze_batch(&trials),
        );
        batch.record_failure("ragged", &AnalysisError::InvalidSampleInterval(0.0));

        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.summary.failed_trials, 1);
        assert_eq!(batch.summary.analyzed_trials, 1);
    }

    #[test]
    fn test_summary_without_reactions() {
        let summary = SessionSummary::from_reports(&[], 2);
        assert_eq!(summary.analyzed_trials, 0);
        assert_eq!(summary.failed_trials, 2);
        assert_eq!(summary.mean_reaction_time_s, None);
    }
}
