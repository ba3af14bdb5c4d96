//! Core data types for reach stop analysis.
//!
//! This module defines the trial container handed over by the loader, the
//! run representation produced by segmentation, and the metric record handed
//! to reporting. Trials are immutable once built; everything downstream
//! borrows their columns as plain `&[f64]` slices.
//!
//! Design principle: Types should make intent obvious. A stop interval is a
//! `Run`, not a `(usize, usize)`; a missing bucket statistic is `None`, not
//! zero.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Channel names used by the analysis core.
pub mod channel {
    pub const TIME: &str = "Time";
    pub const X_VEL: &str = "X_Vel";
    pub const Y_VEL: &str = "Y_Vel";
    pub const VXY_MAG: &str = "Vxy_Mag";
    pub const DIST_FROM_TARGET: &str = "Dist_From_Target";
}

/// Column layout of the robot's exported data, in file order.
const ROBOT_CHANNELS: [&str; 26] = [
    "Time",
    "Des_X_Pos",
    "Des_Y_Pos",
    "X_Pos",
    "Y_Pos",
    "OptoForce_X",
    "OptoForce_Y",
    "OptoForce_Z",
    "OptoForce_Z_Torque",
    "Theta_1",
    "Theta_2",
    "Fxy_Mag",
    "Fxy_Angle",
    "CorrForce_X",
    "Corr_Force_Y",
    "Target_Num",
    "X_Vel",
    "Y_Vel",
    "Vxy_Mag",
    "Vxy_Angle",
    "Dist_From_Target",
    "Disp_Btw_Pts",
    "Est_Vel",
    "To_From_Home",
    "Num_Prev_Targets",
    "Resistance",
];

/// Mapping from channel name to column index.
///
/// Shared between all trials of a recording session, hence usually held
/// behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSchema {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl ChannelSchema {
    /// Build a schema from ordered channel names. Later duplicates shadow
    /// earlier ones on lookup.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { names, index }
    }

    /// The 26-channel layout written by the reaching robot.
    pub fn robot() -> Self {
        Self::new(ROBOT_CHANNELS)
    }

    /// Column index of a channel.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Channel names in column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One reach episode: sample-aligned channels at a fixed interval.
///
/// Invariant: every column has the same length and `dt` is finite and
/// positive. Both are checked on construction, so analysis code can index
/// channels against each other freely.
#[derive(Debug, Clone)]
pub struct Trial {
    schema: Arc<ChannelSchema>,
    columns: Vec<Vec<f64>>,
    dt: f64,
}

impl Trial {
    /// Build a trial from row-major `samples × channels` data.
    pub fn from_rows(schema: Arc<ChannelSchema>, rows: &[Vec<f64>], dt: f64) -> Result<Self> {
        check_dt(dt)?;

        let width = schema.len();
        let mut columns = vec![Vec::with_capacity(rows.len()); width];
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(AnalysisError::ColumnCountMismatch {
                    row: row_idx,
                    expected: width,
                    found: row.len(),
                });
            }
            for (column, &value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }

        Ok(Self { schema, columns, dt })
    }

    /// Build a trial from named columns. Column order defines the schema.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<f64>)>, dt: f64) -> Result<Self> {
        check_dt(dt)?;

        let (names, columns): (Vec<String>, Vec<Vec<f64>>) = columns
            .into_iter()
            .map(|(name, values)| (name.into(), values))
            .unzip();

        if let Some(expected) = columns.first().map(Vec::len) {
            for (name, column) in names.iter().zip(&columns) {
                if column.len() != expected {
                    return Err(AnalysisError::ChannelLengthMismatch {
                        channel: name.clone(),
                        expected,
                        found: column.len(),
                    });
                }
            }
        }

        Ok(Self {
            schema: Arc::new(ChannelSchema::new(names)),
            columns,
            dt,
        })
    }

    /// Borrow a channel by name.
    pub fn channel(&self, name: &str) -> Result<&[f64]> {
        self.try_channel(name)
            .ok_or_else(|| AnalysisError::MissingChannel(name.to_string()))
    }

    /// Borrow a channel by name, if present.
    pub fn try_channel(&self, name: &str) -> Option<&[f64]> {
        self.schema
            .index_of(name)
            .and_then(|i| self.columns.get(i))
            .map(Vec::as_slice)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample interval in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn schema(&self) -> &ChannelSchema {
        &self.schema
    }

    /// Time of a sample in seconds.
    ///
    /// Reads the `Time` channel when the trial has one, otherwise falls back
    /// to `index * dt` from the start of the trial.
    pub fn time_at(&self, index: usize) -> Option<f64> {
        self.time_at_with_dt(index, self.dt)
    }

    /// Like `time_at`, with `dt` standing in for the trial's own interval
    /// when there is no `Time` channel.
    pub fn time_at_with_dt(&self, index: usize, dt: f64) -> Option<f64> {
        if index >= self.len() {
            return None;
        }
        match self.try_channel(channel::TIME) {
            Some(time) => Some(time[index]),
            None => Some(index as f64 * dt),
        }
    }

    /// Time bounds of each run, for shading stop intervals on a time axis.
    pub fn run_spans(&self, runs: &[Run]) -> Result<Vec<RunSpan>> {
        self.run_spans_with_dt(runs, self.dt)
    }

    /// Time bounds of each run using `dt` as the sample interval, e.g. an
    /// analysis-wide override.
    pub fn run_spans_with_dt(&self, runs: &[Run], dt: f64) -> Result<Vec<RunSpan>> {
        check_dt(dt)?;
        runs.iter()
            .map(|run| {
                match (self.time_at_with_dt(run.start, dt), self.time_at_with_dt(run.end, dt)) {
                    (Some(start_s), Some(end_s)) => Ok(RunSpan { start_s, end_s }),
                    _ => Err(AnalysisError::RunOutOfBounds {
                        run: *run,
                        len: self.len(),
                    }),
                }
            })
            .collect()
    }
}

fn check_dt(dt: f64) -> Result<()> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::InvalidSampleInterval(dt))
    }
}

/// A maximal contiguous range of sample indices satisfying a predicate.
///
/// Both ends are inclusive, so a run always holds at least one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RunBounds")]
pub struct Run {
    /// First sample index.
    pub start: usize,
    /// Last sample index (inclusive).
    pub end: usize,
}

impl Run {
    /// Creates a run over `start..=end`.
    ///
    /// Callers guarantee `start <= end`; segmentation never builds anything
    /// else.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "run start {start} after end {end}");
        Self { start, end }
    }

    /// Number of samples in the run.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always false: a run holds at least one sample.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Member sample indices.
    pub fn indices(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices().contains(&index)
    }

    /// Borrow the run's samples from a signal.
    pub fn slice<'a>(&self, signal: &'a [f64]) -> Result<&'a [f64]> {
        signal
            .get(self.indices())
            .ok_or(AnalysisError::RunOutOfBounds {
                run: *self,
                len: signal.len(),
            })
    }
}

/// Unchecked wire form of a `Run`.
#[derive(Deserialize)]
struct RunBounds {
    start: usize,
    end: usize,
}

impl TryFrom<RunBounds> for Run {
    type Error = String;

    fn try_from(bounds: RunBounds) -> std::result::Result<Self, Self::Error> {
        if bounds.start > bounds.end {
            return Err(format!(
                "run start {} after end {}",
                bounds.start, bounds.end
            ));
        }
        Ok(Self {
            start: bounds.start,
            end: bounds.end,
        })
    }
}

/// Start and end time of a run in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSpan {
    pub start_s: f64,
    pub end_s: f64,
}

/// Summary of one bucket of stops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopMetrics {
    /// Number of stops.
    pub stop_count: usize,
    /// Sum of stop spans in seconds, measured first sample to last sample.
    pub total_duration_s: f64,
    /// Mean distance from target over every stopped sample. `None` when the
    /// bucket holds no stops.
    pub mean_distance: Option<f64>,
}

impl StopMetrics {
    /// Metrics of a bucket with no stops.
    pub fn empty() -> Self {
        Self {
            stop_count: 0,
            total_duration_s: 0.0,
            mean_distance: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stop_count == 0
    }
}

impl Default for StopMetrics {
    fn default() -> Self {
        Self::empty()
    }
}
