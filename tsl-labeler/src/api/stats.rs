//! Label statistics endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use tsl_common::{Error, LabelStats};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Annotator whose own total is reported
    pub labeler: Option<String>,
    /// Size of the recent-labels view
    pub recent: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// False when the store could not be read
    pub available: bool,
    #[serde(flatten)]
    pub stats: LabelStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /api/stats
///
/// Recomputed from the store on every call. A store that cannot be read
/// yields empty statistics with `available: false`.
pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Json<StatsResponse> {
    let labeler = query.labeler.as_deref().map(str::trim).filter(|l| !l.is_empty());
    let recent = query.recent.unwrap_or(state.recent_limit);

    match state.store.read_all().await {
        Ok(records) => Json(StatsResponse {
            available: true,
            stats: LabelStats::from_records(&records, recent, labeler),
            error: None,
        }),
        Err(e) => {
            let err = Error::StoreReadFailed(e);
            warn!(backend = state.store.backend(), error = %err, "Statistics unavailable");
            Json(StatsResponse {
                available: false,
                stats: LabelStats::default(),
                error: Some(err.to_string()),
            })
        }
    }
}
