//! Stop segmentation: threshold masks to runs.
//!
//! This module turns a 1-D signal into the list of intervals where it stays
//! near zero:
//! - Build the mask `|signal[i]| < limit`
//! - Group contiguous true indices into maximal runs, in ascending order
//! - Drop runs shorter than a minimum length (event-level noise suppression,
//!   separate from the signal-level low-pass)
//!
//! Runs never overlap and are always ordered by start index. Filtering builds
//! a new list by inclusion; surviving runs are passed through untouched.

use tracing::trace;

use crate::types::Run;

/// Mask of samples whose magnitude is strictly below `limit`.
///
/// NaN samples are never below the limit.
pub fn below_threshold_mask(signal: &[f64], limit: f64) -> Vec<bool> {
    signal.iter().map(|value| value.abs() < limit).collect()
}

/// Group the true entries of a mask into maximal contiguous runs.
///
/// A new run opens at the first true index and at every true index whose
/// predecessor in the true-index list is more than one step back. A lone
/// true index becomes a run of length 1.
pub fn runs_from_mask(mask: &[bool]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut current: Option<Run> = None;

    let true_indices = mask
        .iter()
        .enumerate()
        .filter(|(_, &flag)| flag)
        .map(|(i, _)| i);

    for index in true_indices {
        current = match current {
            Some(run) if index == run.end + 1 => Some(Run::new(run.start, index)),
            Some(run) => {
                runs.push(run);
                Some(Run::new(index, index))
            }
            None => Some(Run::new(index, index)),
        };
    }
    runs.extend(current);
    runs
}

/// Runs where `|signal| < limit`.
pub fn extract_runs(signal: &[f64], limit: f64) -> Vec<Run> {
    let runs = runs_from_mask(&below_threshold_mask(signal, limit));
    trace!(samples = signal.len(), limit, runs = runs.len(), "extracted runs");
    runs
}

/// Keep the runs holding at least `min_len` samples.
pub fn filter_short_runs(runs: &[Run], min_len: usize) -> Vec<Run> {
    runs.iter()
        .filter(|run| run.len() >= min_len)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(bits: &str) -> Vec<bool> {
        bits.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn test_mask_is_strict_and_symmetric() {
        let m = below_threshold_mask(&[0.0, 0.5, -0.5, 0.49, -0.49, 1.0, f64::NAN], 0.5);
        assert_eq!(m, vec![true, false, false, true, true, false, false]);
    }

    #[test]
    fn test_empty_mask_has_no_runs() {
        assert!(runs_from_mask(&[]).is_empty());
        assert!(runs_from_mask(&mask("0000")).is_empty());
    }

    #[test]
    fn test_all_true_is_one_run() {
        assert_eq!(runs_from_mask(&mask("11111")), vec![Run::new(0, 4)]);
    }

    #[test]
    fn test_runs_touching_both_edges() {
        assert_eq!(
            runs_from_mask(&mask("1100111")),
            vec![Run::new(0, 1), Run::new(4, 6)]
        );
    }

    #[test]
    fn test_isolated_index_is_length_one_run() {
        assert_eq!(
            runs_from_mask(&mask("0010110")),
            vec![Run::new(2, 2), Run::new(4, 5)]
        );
    }

    #[test]
    fn test_extract_runs_velocity_scenario() {
        // Moving for 5 samples, stopped for 10, moving for 5.
        let mut velocity = vec![0.0; 20];
        for i in (0..5).chain(15..20) {
            velocity[i] = 1.0;
        }
        let runs = extract_runs(&velocity, 0.5);
        assert_eq!(runs, vec![Run::new(5, 14)]);
        assert_eq!(runs[0].len(), 10);
    }

    #[test]
    fn test_filter_drops_short_runs() {
        let runs = vec![Run::new(0, 0), Run::new(5, 14), Run::new(17, 18)];
        assert_eq!(filter_short_runs(&runs, 3), vec![Run::new(5, 14)]);
    }

    #[test]
    fn test_filter_threshold_is_inclusive() {
        let runs = vec![Run::new(0, 2), Run::new(6, 7)];
        assert_eq!(filter_short_runs(&runs, 3), vec![Run::new(0, 2)]);
    }

    #[test]
    fn test_filter_keeps_order() {
        let runs = vec![Run::new(0, 4), Run::new(6, 6), Run::new(8, 20), Run::new(22, 30)];
        assert_eq!(
            filter_short_runs(&runs, 2),
            vec![Run::new(0, 4), Run::new(8, 20), Run::new(22, 30)]
        );
    }

    #[test]
    fn test_filter_empty_and_all_removed() {
        assert!(filter_short_runs(&[], 3).is_empty());
        assert!(filter_short_runs(&[Run::new(1, 1), Run::new(3, 4)], 5).is_empty());
    }

    #[test]
    fn test_filter_with_zero_or_one_keeps_everything() {
        let runs = vec![Run::new(1, 1), Run::new(3, 4)];
        assert_eq!(filter_short_runs(&runs, 0), runs);
        assert_eq!(filter_short_runs(&runs, 1), runs);
    }
}
