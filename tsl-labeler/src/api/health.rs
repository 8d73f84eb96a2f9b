//! Liveness probe
//!
//! Answers without touching the label store or the dataset fetcher, so it
//! stays fast when either backend is down.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    /// Configured label store backend (`csv`, `sheets`, `memory`)
    pub store: &'static str,
    /// Messages currently available for sampling
    pub dataset_size: usize,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        module: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        store: state.store.backend(),
        dataset_size: state.source.read().await.len(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
