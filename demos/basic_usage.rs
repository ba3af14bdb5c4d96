/// Basic usage example: Build a reaching trial, get its stops
use reach_stops::{AnalysisConfig, StopAnalyzer, StopBucket, Trial, TrialAnalysis};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Reach Stops: Basic Example ===\n");

    // Default config: 1 kHz robot data, 50 Hz low-pass, 11-sample stops
    let analyzer = StopAnalyzer::new(AnalysisConfig::default())?;

    // Simulate one reach: wait, hesitate halfway, settle on the target
    let samples = 1_200;
    let velocity: Vec<f64> = (0..samples)
        .map(|i| match i {
            0..=199 => 0.0,     // waiting for the cue
            500..=649 => 0.0,   // mid-reach hesitation
            1_000.. => 0.0,     // resting on target
            _ => 0.25,
        })
        .collect();
    let distance: Vec<f64> = (0..samples)
        .map(|i| {
            if i < 250 {
                120.0
            } else {
                (120.0 - 0.15 * (i - 250) as f64).max(3.0)
            }
        })
        .collect();

    let trial = Trial::from_columns(
        vec![("Vxy_Mag", velocity), ("Dist_From_Target", distance)],
        0.001,
    )?;

    println!("Analyzing {} samples...\n", trial.len());
    let analysis = analyzer.analyze(&trial)?;
    print_analysis(&trial, &analysis)?;

    Ok(())
}

fn print_analysis(trial: &Trial, analysis: &TrialAnalysis) -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Stops ---");
    for (i, span) in trial.run_spans_with_dt(&analysis.runs, analysis.dt)?.iter().enumerate() {
        println!(
            "  [{i}] {:.3}s - {:.3}s ({} samples)",
            span.start_s,
            span.end_s,
            analysis.runs[i].len()
        );
    }
    println!("  Discarded short runs: {}", analysis.discarded_runs);

    match analysis.reaction_time_s {
        Some(t) => println!("\nReaction time: {t:.3}s"),
        None => println!("\nNo reaction detected"),
    }

    println!("\n--- Buckets ---");
    print_bucket(
        "Overall",
        analysis.overall.stop_count,
        analysis.overall.total_duration_s,
        analysis.overall.mean_distance,
    );
    if let Some(before) = &analysis.before_reaction {
        print_stop_bucket("Before reaction", before);
    }
    if let Some(after) = &analysis.after_reaction {
        print_stop_bucket("After reaction", after);
    }
    print_stop_bucket("Within target", &analysis.within_target);
    Ok(())
}

fn print_stop_bucket(label: &str, bucket: &StopBucket) {
    print_bucket(
        label,
        bucket.metrics.stop_count,
        bucket.metrics.total_duration_s,
        bucket.metrics.mean_distance,
    );
}

fn print_bucket(label: &str, count: usize, duration_s: f64, mean_distance: Option<f64>) {
    let distance = mean_distance
        .map(|d| format!("{d:.2}"))
        .unwrap_or_else(|| "-".to_string());
    println!("  {label:<16} stops={count} duration={duration_s:.3}s mean_distance={distance}");
}
