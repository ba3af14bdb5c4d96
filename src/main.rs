//! Reach Stop Analysis CLI
//!
//! Runs the stop analysis over a bundle of trials and writes a JSON report.
//! The bundle is plain JSON produced by the export step of the recording
//! pipeline:
//!
//! ```text
//! { "channels": ["Time", ...],            // optional, robot layout if absent
//!   "trials": [ { "id": "P01_T1_V0_3", "dt": 0.001, "rows": [[...], ...] } ] }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use reach_stops::{AnalysisConfig, BatchReport, ChannelSchema, StopAnalyzer, Trial};

/// Reach Stops - detect and classify stops in robotic reaching trials
#[derive(Parser, Debug)]
#[command(name = "reach-stops")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a trial bundle
    Analyze {
        /// Input trial bundle (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output report path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Debug, Deserialize)]
struct TrialBundle {
    #[serde(default)]
    channels: Option<Vec<String>>,
    trials: Vec<TrialRecord>,
}

#[derive(Debug, Deserialize)]
struct TrialRecord {
    id: String,
    dt: f64,
    rows: Vec<Vec<f64>>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    match cli.command {
        Commands::Analyze {
            input,
            output,
            pretty,
        } => run_analyze(config, &input, output.as_deref(), pretty),
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn run_analyze(
    config: AnalysisConfig,
    input: &Path,
    output: Option<&Path>,
    pretty: bool,
) -> anyhow::Result<()> {
    let bundle = load_bundle(input)?;
    let schema = Arc::new(match bundle.channels {
        Some(names) => ChannelSchema::new(names),
        None => ChannelSchema::robot(),
    });

    // A malformed trial is reported and skipped, never fatal to the batch.
    let mut ids = Vec::with_capacity(bundle.trials.len());
    let mut trials = Vec::with_capacity(bundle.trials.len());
    let mut malformed = Vec::new();
    for record in bundle.trials {
        match Trial::from_rows(Arc::clone(&schema), &record.rows, record.dt) {
            Ok(trial) => {
                ids.push(record.id);
                trials.push(trial);
            }
            Err(err) => {
                error!(trial = %record.id, error = %err, "skipping malformed trial");
                malformed.push((record.id, err));
            }
        }
    }
    info!(trials = trials.len(), input = %input.display(), "loaded trials");

    let analyzer = StopAnalyzer::new(config)?;
    let results = analyzer.analyze_batch(&trials);
    let mut report = BatchReport::collect(analyzer.config(), &ids, &trials, results);
    for (id, err) in malformed {
        report.record_failure(id, &err);
    }

    let json = if pretty {
        report.to_json_pretty()?
    } else {
        report.to_json()?
    };

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(
                analyzed = report.summary.analyzed_trials,
                failed = report.summary.failed_trials,
                output = %path.display(),
                "report written"
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn load_bundle(path: &Path) -> anyhow::Result<TrialBundle> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}
