//! Dataset ingest check.
//!
//! Loads every configured dataset once through the same loader the server
//! uses and reports what would be published. Useful for validating dataset
//! files before deploying them.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use cedar::config::Config;
use cedar::dataset::{DatasetKind, DatasetLoader, LoadOutcome, SourceProvider};
use cedar::{AgencyType, BoundaryCache};

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Load and validate station/district datasets")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "cedar.toml")]
    config: PathBuf,

    /// Only load these dataset kinds (e.g. fire_districts)
    #[arg(long, value_delimiter = ',')]
    only: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    cedar::logging::init("info")?;

    let args = Args::parse();

    info!("Cedar Ingest Check");
    let config = Config::load_from_file(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    let only: Vec<DatasetKind> = args
        .only
        .iter()
        .map(|s| {
            serde_json::from_value(serde_json::Value::String(s.clone()))
                .with_context(|| format!("Unknown dataset kind {}", s))
        })
        .collect::<Result<_>>()?;

    let datasets: Vec<_> = config
        .datasets
        .iter()
        .filter(|d| only.is_empty() || only.contains(&d.kind))
        .cloned()
        .collect();

    if datasets.is_empty() {
        warn!("No datasets selected");
        return Ok(());
    }

    let cache = Arc::new(BoundaryCache::new());
    let provider = Arc::new(SourceProvider::new().context("Failed to build dataset provider")?);
    let loader = DatasetLoader::new(provider, cache.clone());

    let report = loader.load_all(&datasets).await;

    let mut failed = 0;
    for (kind, outcome) in &report {
        match outcome {
            LoadOutcome::Published {
                records, skipped, ..
            } => info!("{}: {} records, {} malformed features skipped", kind, records, skipped),
            LoadOutcome::Failed { attempts, error } => {
                failed += 1;
                warn!("{}: failed after {} attempt(s): {}", kind, attempts, error);
            }
            other => info!("{}: {:?}", kind, other),
        }
    }

    let snapshot = cache.snapshot();
    for agency in AgencyType::all() {
        info!(
            "  {}: {} districts, {} facilities",
            agency,
            snapshot.districts(*agency).len(),
            snapshot.facilities(*agency).len()
        );
    }

    let stats = loader.stats();
    info!(
        "Done: {} published, {} failed, {} features skipped",
        stats.published, stats.failed, stats.features_skipped
    );

    if failed > 0 {
        anyhow::bail!("{} dataset(s) failed to load", failed);
    }

    Ok(())
}
