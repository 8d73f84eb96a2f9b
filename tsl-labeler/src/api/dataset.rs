//! Message source endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;
use tsl_common::MessageSource;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DatasetResponse {
    pub loaded: bool,
    pub size: usize,
    /// Where `POST /api/dataset/load` fetches from
    pub source: String,
}

impl DatasetResponse {
    fn new(state: &AppState, size: usize) -> Self {
        Self {
            loaded: size > 0,
            size,
            source: state.fetcher.describe(),
        }
    }
}

/// GET /api/dataset
pub async fn get_dataset(State(state): State<AppState>) -> Json<DatasetResponse> {
    let size = state.source.read().await.len();
    Json(DatasetResponse::new(&state, size))
}

/// POST /api/dataset/load
///
/// Replaces the current source with a fresh fetch. On failure the source is
/// left empty and 502 is returned.
pub async fn load_dataset(State(state): State<AppState>) -> ApiResult<Json<DatasetResponse>> {
    info!(source = %state.fetcher.describe(), "Loading dataset");

    // Fetch outside the lock so session actions are not held up by the network
    let mut fresh = MessageSource::new();
    let result = fresh.load(state.fetcher.as_ref()).await;
    *state.source.write().await = fresh;

    let size = result?;
    Ok(Json(DatasetResponse::new(&state, size)))
}
