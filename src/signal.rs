//! Signal conditioning ahead of thresholding.
//!
//! This module provides the signal-level preprocessing of the stop detector:
//! - A 2nd-order Butterworth low-pass, applied zero-phase (forward pass then
//!   backward pass) so threshold crossings stay aligned with the trial's time
//!   axis
//! - Odd-reflection padding of the edges, with steady-state initial
//!   conditions, so the filter does not ring at the trial boundaries
//! - A numerical gradient for deriving rate signals (e.g. rate of change of
//!   distance to target)
//!
//! Design note: everything here works on complete trials. Output length
//! always equals input length.

use std::f64::consts::{PI, SQRT_2};

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Samples of odd-reflection padding added to each edge before filtering.
///
/// Three times the tap count of one 2nd-order section.
pub const PAD_LEN: usize = 3 * (2 * 1 + 1);

/// Shortest signal that can be filtered zero-phase.
pub const MIN_FILTER_LEN: usize = PAD_LEN + 1;

/// Parameters for the low-pass stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Whether the stop signal is smoothed before thresholding.
    pub enabled: bool,

    /// Cutoff frequency in Hz. Must sit below Nyquist for the trial's sample
    /// interval. Typical: 50 Hz at the robot's 1 kHz rate, high enough to
    /// keep the shape of genuine stops while removing sensor spikes.
    pub cutoff_hz: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cutoff_hz: 50.0,
        }
    }
}

/// One second-order IIR section, normalized so `a0 == 1`.
///
/// Runs in transposed direct form II.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    b: [f64; 3],
    a: [f64; 2],
}

impl Biquad {
    /// Design a 2nd-order Butterworth low-pass by bilinear transform with
    /// frequency prewarping.
    pub fn butterworth_lowpass(cutoff_hz: f64, sample_rate_hz: f64) -> Result<Self> {
        if !(sample_rate_hz.is_finite() && sample_rate_hz > 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "sample rate must be positive, got {sample_rate_hz}"
            )));
        }
        let nyquist = sample_rate_hz / 2.0;
        if !(cutoff_hz.is_finite() && cutoff_hz > 0.0 && cutoff_hz < nyquist) {
            return Err(AnalysisError::InvalidConfig(format!(
                "cutoff {cutoff_hz} Hz must lie in (0, {nyquist}) Hz"
            )));
        }

        let k = (PI * cutoff_hz / sample_rate_hz).tan();
        let k2 = k * k;
        let norm = 1.0 / (1.0 + SQRT_2 * k + k2);

        let b0 = k2 * norm;
        Ok(Self {
            b: [b0, 2.0 * b0, b0],
            a: [2.0 * (k2 - 1.0) * norm, (1.0 - SQRT_2 * k + k2) * norm],
        })
    }

    /// Numerator and denominator coefficients, `a[0] == 1`.
    pub fn coefficients(&self) -> ([f64; 3], [f64; 3]) {
        (self.b, [1.0, self.a[0], self.a[1]])
    }

    /// Filter state after a long run of unit input.
    ///
    /// Scaling it by the first input sample starts the filter as if the
    /// signal had always been at that level.
    fn steady_state(&self) -> [f64; 2] {
        let [b0, b1, b2] = self.b;
        let [a1, a2] = self.a;
        let gain = (b0 + b1 + b2) / (1.0 + a1 + a2);
        [b1 + b2 - (a1 + a2) * gain, b2 - a2 * gain]
    }

    /// Run the section over `input`, starting from steady state at `input[0]`.
    fn run(&self, input: &[f64]) -> Vec<f64> {
        let [b0, b1, b2] = self.b;
        let [a1, a2] = self.a;
        let level = input.first().copied().unwrap_or(0.0);
        let [zi0, zi1] = self.steady_state();
        let (mut z0, mut z1) = (zi0 * level, zi1 * level);

        input
            .iter()
            .map(|&x| {
                let y = b0 * x + z0;
                z0 = b1 * x - a1 * y + z1;
                z1 = b2 * x - a2 * y;
                y
            })
            .collect()
    }
}

/// Zero-phase 2nd-order Butterworth low-pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButterworthFilter {
    section: Biquad,
}

impl ButterworthFilter {
    /// Create a filter for the given cutoff and sample rate.
    pub fn new(cutoff_hz: f64, sample_rate_hz: f64) -> Result<Self> {
        Ok(Self {
            section: Biquad::butterworth_lowpass(cutoff_hz, sample_rate_hz)?,
        })
    }

    /// Create a filter for a trial sampled every `dt` seconds.
    pub fn for_interval(config: &FilterConfig, dt: f64) -> Result<Self> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(AnalysisError::InvalidSampleInterval(dt));
        }
        Self::new(config.cutoff_hz, 1.0 / dt)
    }

    /// The underlying section.
    pub fn section(&self) -> &Biquad {
        &self.section
    }

    /// Filter forward and backward so the output has no phase shift.
    ///
    /// The signal is padded with `PAD_LEN` odd-reflected samples at each end
    /// and both passes start from steady state, matching the usual
    /// forward-backward (`filtfilt`) construction. Fails on signals of
    /// `PAD_LEN` samples or fewer.
    pub fn filtfilt(&self, signal: &[f64]) -> Result<Vec<f64>> {
        let n = signal.len();
        if n < MIN_FILTER_LEN {
            return Err(AnalysisError::SignalTooShort {
                len: n,
                min: MIN_FILTER_LEN,
            });
        }

        let extended = odd_extend(signal, PAD_LEN);
        let mut forward = self.section.run(&extended);
        forward.reverse();
        let mut backward = self.section.run(&forward);
        backward.reverse();

        backward.truncate(PAD_LEN + n);
        backward.drain(..PAD_LEN);
        Ok(backward)
    }
}

/// Extend a signal by point reflection about each end sample.
///
/// Requires `pad < signal.len()`.
pub fn odd_extend(signal: &[f64], pad: usize) -> Vec<f64> {
    let n = signal.len();
    debug_assert!(pad < n, "pad {pad} must be shorter than signal {n}");
    let (first, last) = (signal[0], signal[n - 1]);

    let mut extended = Vec::with_capacity(n + 2 * pad);
    extended.extend((1..=pad).rev().map(|k| 2.0 * first - signal[k]));
    extended.extend_from_slice(signal);
    extended.extend((1..=pad).map(|k| 2.0 * last - signal[n - 1 - k]));
    extended
}

/// Numerical derivative with uniform sample spacing.
///
/// Central differences in the interior, one-sided differences at both ends.
/// Output length equals input length.
pub fn gradient(signal: &[f64], spacing: f64) -> Result<Vec<f64>> {
    let n = signal.len();
    if n < 2 {
        return Err(AnalysisError::SignalTooShort { len: n, min: 2 });
    }

    let mut out = Vec::with_capacity(n);
    out.push((signal[1] - signal[0]) / spacing);
    out.extend(
        signal
            .windows(3)
            .map(|w| (w[2] - w[0]) / (2.0 * spacing)),
    );
    out.push((signal[n - 1] - signal[n - 2]) / spacing);
    Ok(out)
}
