//! Annotation session endpoints
//!
//! Each handler holds the session lock for its whole run, so a submit that
//! is waiting on the store blocks a concurrent next/skip until it resolves.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tsl_common::{AnnotationSession, LabelRecord, Progress, SessionState};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Snapshot of the session as shown to the annotator
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub state: SessionState,
    pub progress: Progress,
    pub dataset_size: usize,
    /// Configured default annotator name
    pub labeler: String,
}

impl SessionResponse {
    async fn snapshot(state: &AppState, session: &AnnotationSession) -> Self {
        Self {
            state: session.state().clone(),
            progress: session.progress(),
            dataset_size: state.source.read().await.len(),
            labeler: state.default_labeler.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub sentiment: String,
    pub confidence: i64,
    /// Falls back to the configured labeler when absent
    #[serde(default)]
    pub labeler: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub record: LabelRecord,
    pub session: SessionResponse,
}

/// GET /api/session
pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let session = state.session.lock().await;
    Json(SessionResponse::snapshot(&state, &session).await)
}

/// POST /api/session/next
///
/// Stages a random message; a no-op while the dataset is empty.
pub async fn next_item(State(state): State<AppState>) -> Json<SessionResponse> {
    let mut session = state.session.lock().await;
    {
        let source = state.source.read().await;
        session.select_next(&source);
    }
    Json(SessionResponse::snapshot(&state, &session).await)
}

/// POST /api/session/skip
pub async fn skip_item(State(state): State<AppState>) -> Json<SessionResponse> {
    let mut session = state.session.lock().await;
    session.skip();
    Json(SessionResponse::snapshot(&state, &session).await)
}

/// POST /api/session/submit
///
/// 409 when nothing is staged, 400 for an unknown sentiment or a confidence
/// outside 1-5, 503 when the store rejects the write (item stays staged).
pub async fn submit_label(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> ApiResult<Json<SubmitResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let labeler = request
        .labeler
        .unwrap_or_else(|| state.default_labeler.clone());

    let mut session = state.session.lock().await;
    let record = session
        .submit(
            &request.sentiment,
            request.confidence,
            labeler.trim(),
            state.store.as_ref(),
        )
        .await?;

    Ok(Json(SubmitResponse {
        record,
        session: SessionResponse::snapshot(&state, &session).await,
    }))
}
