//! Assignment server.
//!
//! Loads the configured datasets, keeps them fresh, and answers station
//! assignment and boundary rendering requests over HTTP.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use cedar::config::Config;
use cedar::dataset::{DatasetLoader, SourceProvider};
use cedar::{Assigner, BoundaryCache};

mod routes;
use routes::AppState;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Station/district assignment server")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "cedar.toml")]
    config: PathBuf,

    /// Listen address (overrides the config file)
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    cedar::logging::init("info")?;

    let args = Args::parse();

    info!("Cedar Assignment Server");
    let config = Config::load_from_file(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    let cache = Arc::new(BoundaryCache::new());
    let provider = Arc::new(SourceProvider::new().context("Failed to build dataset provider")?);
    let loader = Arc::new(DatasetLoader::new(provider, cache.clone()));

    for (kind, outcome) in loader.load_all(&config.datasets).await {
        info!("Initial load of {}: {:?}", kind, outcome);
    }

    if config.server.refresh_interval_secs > 0 {
        spawn_refresh(
            loader.clone(),
            config.clone(),
            Duration::from_secs(config.server.refresh_interval_secs),
        );
    }

    let listen = args.listen.unwrap_or_else(|| config.server.listen.clone());

    let state = Arc::new(AppState {
        assigner: Assigner::new(cache),
        loader,
        config,
    });

    let app = Router::new()
        .route("/health", get(routes::health_handler))
        .route("/v1/assign", get(routes::assign_handler))
        .route("/v1/assign/batch", post(routes::assign_batch_handler))
        .route("/v1/boundaries", get(routes::boundaries_handler))
        .route("/v1/refresh", post(routes::refresh_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Reload every dataset on a fixed interval
fn spawn_refresh(loader: Arc<DatasetLoader>, config: Config, every: Duration) {
    info!("Refreshing datasets every {:?}", every);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // the initial load already happened
        ticker.tick().await;
        loop {
            ticker.tick().await;
            for (kind, outcome) in loader.load_all(&config.datasets).await {
                info!("Periodic refresh of {}: {:?}", kind, outcome);
            }
        }
    });
}
