//! Shared helpers for tsl-labeler integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tsl_common::store::MemoryLabelStore;
use tsl_common::{
    AnnotationSession, Error, LabelRecord, LabelStore, MessageFetcher, MessageSource, StoreError,
};
use tsl_labeler::{build_router, AppState};

pub const CHAT: [&str; 2] = ["gg ez", "POGGERS that was insane"];

/// Store whose backend is always unreachable
pub struct UnavailableStore;

#[async_trait]
impl LabelStore for UnavailableStore {
    async fn append(&self, _record: &LabelRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn read_all(&self) -> Result<Vec<LabelRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn backend(&self) -> &'static str {
        "unavailable"
    }
}

/// Fetcher returning a fixed message list
pub struct StaticFetcher(pub Vec<String>);

#[async_trait]
impl MessageFetcher for StaticFetcher {
    async fn fetch_all(&self) -> tsl_common::Result<Vec<String>> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        format!("static ({} messages)", self.0.len())
    }
}

/// Fetcher that always fails
pub struct FailingFetcher;

#[async_trait]
impl MessageFetcher for FailingFetcher {
    async fn fetch_all(&self) -> tsl_common::Result<Vec<String>> {
        Err(Error::SourceFetchFailed("API error 503: down".to_string()))
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}

pub fn chat_fetcher() -> Arc<dyn MessageFetcher> {
    Arc::new(StaticFetcher(CHAT.iter().map(|s| s.to_string()).collect()))
}

/// State with a loaded source and the given store
pub fn state_with_store(store: Arc<dyn LabelStore>) -> AppState {
    AppState::new(AnnotationSession::new(500), store, chat_fetcher())
        .with_labeler("Alice")
        .with_source(MessageSource::from_messages(CHAT))
}

/// App over an in-memory store; the store handle is returned for inspection
pub fn setup_app() -> (Router, Arc<MemoryLabelStore>) {
    let store = Arc::new(MemoryLabelStore::new());
    let app = build_router(state_with_store(store.clone()));
    (app, store)
}

/// Create request without a body
pub fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Create request with a JSON body
pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
