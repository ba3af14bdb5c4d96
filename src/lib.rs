//! Reach Stop Analysis Library
//!
//! Detects and classifies the moments a subject's hand stops during a
//! robotic reaching task, and summarizes them per trial: how many stops, how
//! long the hand was stopped, where it stopped relative to the target, and
//! how long the subject took to start moving toward it.
//!
//! # Design Philosophy
//!
//! - **Complete trials in, evidence out**: every stage is a pure function of
//!   an already-captured trial. Nothing streams and nothing is learned;
//!   thresholds are tuning values handed in through `AnalysisConfig`.
//! - **Absence is not failure**: no reaction, or an empty bucket, is `None`.
//!   Errors are reserved for malformed trials and unusable parameters.
//! - **One trial at a time**: trials share nothing, so batches run in
//!   parallel and one bad trial never spoils the rest.
//!
//! # Example
//!
//! ```ignore
//! use reach_stops::{AnalysisConfig, StopAnalyzer, Trial};
//!
//! let analyzer = StopAnalyzer::new(AnalysisConfig::default())?;
//! let trial = Trial::from_columns(
//!     vec![("Vxy_Mag", velocity), ("Dist_From_Target", distance)],
//!     0.001,
//! )?;
//!
//! let analysis = analyzer.analyze(&trial)?;
//! println!("{} stops, {:.3}s stopped", analysis.overall.stop_count, analysis.overall.total_duration_s);
//! ```

pub mod classification;
pub mod config;
pub mod error;
pub mod export;
pub mod metrics;
pub mod pipeline;
pub mod reaction;
pub mod segmentation;
pub mod signal;
pub mod types;

#[cfg(test)]
mod property_tests;

// Re-export commonly used types
pub use config::{AnalysisConfig, ConfigError, StopSignal};
pub use error::AnalysisError;
pub use export::{BatchReport, TrialReport};
pub use pipeline::{StopAnalyzer, StopBucket, TrialAnalysis};
pub use reaction::{ReactionConfig, ReactionDetector};
pub use signal::{ButterworthFilter, FilterConfig};
pub use types::{ChannelSchema, Run, RunSpan, StopMetrics, Trial};
