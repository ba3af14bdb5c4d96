/// Property-based tests for the run bookkeeping invariants
/// Random masks, signals and thresholds through segmentation,
/// classification and aggregation.

#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;

    use crate::classification::partition_by_reaction;
    use crate::metrics::total_stop_duration;
    use crate::segmentation::{below_threshold_mask, extract_runs, filter_short_runs, runs_from_mask};
    use crate::signal::{ButterworthFilter, MIN_FILTER_LEN};
    use crate::types::Run;

    fn signal_strategy() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(-1.0f64..1.0, 0..200)
    }

    fn runs_strategy() -> impl Strategy<Value = Vec<Run>> {
        prop::collection::vec(any::<bool>(), 0..200).prop_map(|mask| runs_from_mask(&mask))
    }

    // =========================================================================
    // Run extraction
    // =========================================================================
    proptest! {
        #[test]
        fn test_runs_are_ordered_and_separated(mask in prop::collection::vec(any::<bool>(), 0..300)) {
            let runs = runs_from_mask(&mask);
            for run in &runs {
                prop_assert!(run.start <= run.end);
                prop_assert!(run.end < mask.len());
            }
            // A gap of at least one false sample between neighbours.
            for pair in runs.windows(2) {
                prop_assert!(pair[0].end + 1 < pair[1].start);
            }
        }

        #[test]
        fn test_runs_cover_exactly_the_true_indices(mask in prop::collection::vec(any::<bool>(), 0..300)) {
            let runs = runs_from_mask(&mask);
            let covered: Vec<usize> = runs.iter().flat_map(|run| run.indices()).collect();
            let expected: Vec<usize> = mask
                .iter()
                .enumerate()
                .filter(|(_, &flag)| flag)
                .map(|(i, _)| i)
                .collect();
            prop_assert_eq!(covered, expected);
        }

        #[test]
        fn test_runs_are_maximal(mask in prop::collection::vec(any::<bool>(), 1..300)) {
            for run in runs_from_mask(&mask) {
                if run.start > 0 {
                    prop_assert!(!mask[run.start - 1]);
                }
                if run.end + 1 < mask.len() {
                    prop_assert!(!mask[run.end + 1]);
                }
            }
        }

        #[test]
        fn test_extracted_samples_are_below_limit(
            signal in signal_strategy(),
            limit in 0.01f64..1.0,
        ) {
            let runs = extract_runs(&signal, limit);
            for run in &runs {
                for i in run.indices() {
                    prop_assert!(signal[i].abs() < limit);
                }
            }
            let stopped = below_threshold_mask(&signal, limit).iter().filter(|&&m| m).count();
            prop_assert_eq!(runs.iter().map(Run::len).sum::<usize>(), stopped);
        }
    }

    // =========================================================================
    // Run filtering
    // =========================================================================
    proptest! {
        #[test]
        fn test_filter_keeps_long_runs_in_order(runs in runs_strategy(), min_len in 0usize..20) {
            let kept = filter_short_runs(&runs, min_len);
            let expected: Vec<Run> = runs.iter().filter(|run| run.len() >= min_len).copied().collect();
            prop_assert_eq!(&kept, &expected);
            prop_assert!(kept.iter().all(|run| run.len() >= min_len));
        }

        #[test]
        fn test_filter_is_idempotent(runs in runs_strategy(), min_len in 0usize..20) {
            let once = filter_short_runs(&runs, min_len);
            prop_assert_eq!(filter_short_runs(&once, min_len), once);
        }
    }

    // =========================================================================
    // Classification and aggregation
    // =========================================================================
    proptest! {
        #[test]
        fn test_partition_is_complete(runs in runs_strategy(), reaction in 0usize..250) {
            let partition = partition_by_reaction(&runs, reaction);
            prop_assert_eq!(partition.before.len() + partition.after.len(), runs.len());
            prop_assert!(partition.before.iter().all(|run| run.end < reaction));
            prop_assert!(partition.after.iter().all(|run| run.end >= reaction));

            // Runs are time ordered, so before-then-after is the original list.
            let mut joined = partition.before.clone();
            joined.extend(partition.after.iter().copied());
            prop_assert_eq!(joined, runs);
        }

        #[test]
        fn test_duration_is_non_negative(runs in runs_strategy(), dt in 0.0001f64..0.1) {
            let total = total_stop_duration(&runs, dt);
            prop_assert!(total >= 0.0);
            let longest = runs.iter().map(Run::len).max().unwrap_or(0);
            prop_assert!(total + 1e-12 >= longest.saturating_sub(1) as f64 * dt);
        }
    }

    // =========================================================================
    // Filtering
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_filtfilt_preserves_length_and_constants(
            level in -10.0f64..10.0,
            len in MIN_FILTER_LEN..500,
        ) {
            let filter = ButterworthFilter::new(50.0, 1000.0).unwrap();
            let out = filter.filtfilt(&vec![level; len]).unwrap();
            prop_assert_eq!(out.len(), len);
            for value in out {
                prop_assert!((value - level).abs() < 1e-9);
            }
        }

        #[test]
        fn test_filtfilt_stays_finite(signal in prop::collection::vec(-1.0f64..1.0, MIN_FILTER_LEN..300)) {
            let filter = ButterworthFilter::new(50.0, 1000.0).unwrap();
            let out = filter.filtfilt(&signal).unwrap();
            prop_assert_eq!(out.len(), signal.len());
            prop_assert!(out.iter().all(|v| v.is_finite() && v.abs() < 3.0));
        }
    }
}
