//! Error types for trial analysis.
//!
//! Every error here is an invalid-input condition: the core works on
//! in-memory arrays, so failures come from malformed trials, signals that are
//! too short to filter, or unusable tuning values. Soft outcomes (no reaction
//! found, an empty stop bucket) are `Option`s on the result types instead.

use thiserror::Error;

use crate::types::Run;

/// Failure while analyzing a single trial.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("signal too short: {len} samples, need at least {min}")]
    SignalTooShort { len: usize, min: usize },

    #[error("channel `{channel}` has {found} samples, expected {expected}")]
    ChannelLengthMismatch {
        channel: String,
        expected: usize,
        found: usize,
    },

    #[error("row {row} has {found} columns, schema has {expected}")]
    ColumnCountMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("missing channel: {0}")]
    MissingChannel(String),

    #[error("run {run:?} exceeds signal of {len} samples")]
    RunOutOfBounds { run: Run, len: usize },

    #[error("invalid sample interval: {0}")]
    InvalidSampleInterval(f64),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl AnalysisError {
    /// True for every malformed-trial or bad-parameter failure.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            AnalysisError::SignalTooShort { .. }
                | AnalysisError::ChannelLengthMismatch { .. }
                | AnalysisError::ColumnCountMismatch { .. }
                | AnalysisError::MissingChannel(_)
                | AnalysisError::RunOutOfBounds { .. }
                | AnalysisError::InvalidSampleInterval(_)
                | AnalysisError::InvalidConfig(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
