//! HTTP handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use cedar::config::Config;
use cedar::dataset::{DatasetKind, DatasetLoader, LoadOutcome, LoaderStats};
use cedar::models::AssignmentRequest;
use cedar::{AgencyType, Assigner, AssignmentResult};

const MAX_BATCH: usize = 10_000;

/// Application state shared across handlers
pub struct AppState {
    pub assigner: Assigner,
    pub loader: Arc<DatasetLoader>,
    pub config: Config,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    generation: u64,
    datasets: Vec<DatasetStatus>,
    loader: LoaderStats,
}

#[derive(Serialize)]
struct DatasetStatus {
    kind: DatasetKind,
    records: usize,
    loaded_at: DateTime<Utc>,
}

/// Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let snapshot = state.loader.cache().snapshot();
    let datasets: Vec<DatasetStatus> = snapshot
        .datasets()
        .into_iter()
        .map(|(kind, info)| DatasetStatus {
            kind,
            records: info.records,
            loaded_at: info.loaded_at,
        })
        .collect();

    Json(HealthResponse {
        status: if datasets.is_empty() { "degraded" } else { "ok" },
        generation: snapshot.generation(),
        datasets,
        loader: state.loader.stats(),
    })
}

#[derive(Deserialize)]
pub struct AssignQueryParams {
    lat: f64,
    lon: f64,
    /// fire, police, coast_guard or hospital
    agency: String,
}

/// Single assignment. Negative results are still 200 responses.
pub async fn assign_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AssignQueryParams>,
) -> Json<AssignmentResult> {
    Json(
        state
            .assigner
            .assign_str(params.lat, params.lon, &params.agency),
    )
}

/// Batch assignment against one snapshot
pub async fn assign_batch_handler(
    State(state): State<Arc<AppState>>,
    Json(requests): Json<Vec<AssignmentRequest>>,
) -> Result<Json<Vec<AssignmentResult>>, (StatusCode, String)> {
    if requests.len() > MAX_BATCH {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("batch of {} exceeds limit of {}", requests.len(), MAX_BATCH),
        ));
    }

    let assigner = state.assigner.clone();
    let results = tokio::task::spawn_blocking(move || assigner.assign_batch(&requests))
        .await
        .map_err(|e| {
            tracing::error!("Batch assignment failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    Ok(Json(results))
}

#[derive(Deserialize)]
pub struct BoundariesQueryParams {
    agency: String,
    /// Simplification tolerance in degrees (defaults to the configured one)
    tolerance: Option<f64>,
}

/// Simplified district boundaries as GeoJSON
pub async fn boundaries_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BoundariesQueryParams>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let agency: AgencyType = params
        .agency
        .parse()
        .map_err(|e: cedar::models::UnknownAgency| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let tolerance = params
        .tolerance
        .unwrap_or(state.config.server.simplify_tolerance);
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "tolerance must be a non-negative number".to_string(),
        ));
    }

    Ok(Json(
        state.assigner.simplified_boundaries(agency, tolerance),
    ))
}

#[derive(Serialize)]
pub struct RefreshEntry {
    kind: DatasetKind,
    #[serde(flatten)]
    outcome: LoadOutcome,
}

/// Explicit reload of every configured dataset
pub async fn refresh_handler(State(state): State<Arc<AppState>>) -> Json<Vec<RefreshEntry>> {
    let report = state.loader.load_all(&state.config.datasets).await;
    Json(
        report
            .into_iter()
            .map(|(kind, outcome)| RefreshEntry { kind, outcome })
            .collect(),
    )
}
