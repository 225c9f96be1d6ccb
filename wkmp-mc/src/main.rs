//! wkmp-mc - Mix Compatibility Engine command-line harness
//!
//! **[MXC-CLI-010]** Reads a JSON array of `{ track_id, features }` records,
//! fingerprints every track, builds the pairwise compatibility matrix and
//! writes a JSON report `{ matrix, rejected }` to stdout or `--output`.
//!
//! Logs go to stderr so stdout stays machine-readable.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use wkmp_mc::export::MixReport;
use wkmp_mc::{
    BatchCompatibilityMatrix, CompatibilityEngine, FingerprintPipeline, MixConfig, TrackFeatures,
};

/// Command-line arguments for wkmp-mc
#[derive(Parser, Debug)]
#[command(name = "wkmp-mc")]
#[command(about = "Mix compatibility matrix for a set of analyzed tracks")]
#[command(version)]
struct Args {
    /// JSON array of { track_id, features } records
    #[arg(short, long)]
    input: PathBuf,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (overrides WKMP_MC_CONFIG and the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level directive, e.g. "debug" or "wkmp_mc=trace"
    #[arg(long, env = "WKMP_MC_LOG_LEVEL")]
    log_level: Option<String>,

    /// Pair-scoring worker threads (overrides [batch] worker_threads)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Compact JSON output
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = MixConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    wkmp_common::logging::init_tracing(&config.logging, args.log_level.as_deref())
        .context("Failed to initialize logging")?;

    info!("Starting wkmp-mc (Mix Compatibility) v{}", env!("CARGO_PKG_VERSION"));

    let content = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to read input file {}", args.input.display()))?;
    let inputs: Vec<TrackFeatures> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse track features from {}", args.input.display()))?;
    info!(tracks = inputs.len(), input = %args.input.display(), "Loaded track features");

    let worker_threads = args.workers.or(config.batch.worker_threads);
    let pipeline = FingerprintPipeline::new(config.weights).context("Invalid dimension weights")?;
    let engine = CompatibilityEngine::new(config.scoring).context("Invalid scoring config")?;

    // Fingerprinting and pair scoring are CPU-bound rayon work
    let report = tokio::task::spawn_blocking(move || -> Result<MixReport> {
        let batch = pipeline.prepare_tracks(&inputs);

        let builder = match worker_threads {
            Some(n) => BatchCompatibilityMatrix::with_worker_threads(engine, n)
                .context("Failed to create pair-scoring pool")?,
            None => BatchCompatibilityMatrix::new(engine),
        };
        let matrix = builder.build(&batch.tracks);

        for index in 0..matrix.len() {
            if let Some(&(best, score)) = matrix.best_matches(index, 1).first() {
                debug!(
                    track_id = %matrix.track_ids()[index],
                    best_match = %matrix.track_ids()[best],
                    score,
                    "Best match"
                );
            }
        }

        Ok(MixReport::new(matrix.to_view(), batch.rejected))
    })
    .await
    .context("Matrix worker panicked")??;

    let json = if args.compact {
        serde_json::to_string(&report)
    } else {
        serde_json::to_string_pretty(&report)
    }
    .context("Failed to serialize report")?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!(output = %path.display(), "Report written");
        }
        None => println!("{}", json),
    }

    info!(
        scored = report.matrix.track_ids.len(),
        rejected = report.rejected.len(),
        "wkmp-mc finished"
    );
    Ok(())
}
