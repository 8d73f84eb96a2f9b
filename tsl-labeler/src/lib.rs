//! tsl-labeler library - Twitch chat sentiment labeling service
//!
//! Serves the labeling UI and a JSON API over one annotation session per
//! process. Every session action runs to completion under the session lock
//! before the next one is accepted.

use axum::Router;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::trace::TraceLayer;
use tsl_common::stats::DEFAULT_RECENT_LIMIT;
use tsl_common::{AnnotationSession, LabelStore, MessageFetcher, MessageSource};

pub mod api;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single annotation session
    pub session: Arc<Mutex<AnnotationSession>>,
    /// Messages available for sampling
    pub source: Arc<RwLock<MessageSource>>,
    /// Where completed labels go
    pub store: Arc<dyn LabelStore>,
    /// Fills `source` on `POST /api/dataset/load`
    pub fetcher: Arc<dyn MessageFetcher>,
    /// Annotator name used when a submission omits one
    pub default_labeler: String,
    /// Default size of the recent-labels view
    pub recent_limit: usize,
}

impl AppState {
    /// Create new application state with an empty source
    pub fn new(
        session: AnnotationSession,
        store: Arc<dyn LabelStore>,
        fetcher: Arc<dyn MessageFetcher>,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            source: Arc::new(RwLock::new(MessageSource::new())),
            store,
            fetcher,
            default_labeler: String::new(),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }

    pub fn with_labeler(mut self, labeler: impl Into<String>) -> Self {
        self.default_labeler = labeler.into();
        self
    }

    pub fn with_recent_limit(mut self, recent_limit: usize) -> Self {
        self.recent_limit = recent_limit;
        self
    }

    /// Pre-populate the message source
    pub fn with_source(self, source: MessageSource) -> Self {
        Self {
            source: Arc::new(RwLock::new(source)),
            ..self
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/guide", get(api::get_guide))
        .route("/api/dataset", get(api::get_dataset))
        .route("/api/dataset/load", post(api::load_dataset))
        .route("/api/session", get(api::get_session))
        .route("/api/session/next", post(api::next_item))
        .route("/api/session/skip", post(api::skip_item))
        .route("/api/session/submit", post(api::submit_label))
        .route("/api/stats", get(api::get_stats));

    Router::new()
        .merge(api)
        .merge(api::ui_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
