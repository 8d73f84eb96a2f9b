//! Integration tests for the annotation session
//!
//! Tests cover:
//! - Successful submit increments the run counter and clears the staged item
//! - Store failures leave the session untouched so the label can be retried
//! - Validation failures (no staged item, bad sentiment, bad confidence)
//!   never reach the store
//! - Sequential submits are stored in call order

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use tsl_common::models::{MESSAGE_ID_MAX, MESSAGE_ID_MIN};
use tsl_common::store::MemoryLabelStore;
use tsl_common::{
    AnnotationSession, Error, LabelRecord, LabelStore, MessageSource, Sentiment, StoreError,
};

/// Store whose backend is always unreachable
struct UnavailableStore;

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

/// Store that counts calls and accepts everything
#[derive(Default)]
struct CountingStore {
    appends: AtomicUsize,
    inner: MemoryLabelStore,
}

#[async_trait]
impl LabelStore for CountingStore {
    async fn append(&self, record: &LabelRecord) -> Result<(), StoreError> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        self.inner.append(record).await
    }

    async fn read_all(&self) -> Result<Vec<LabelRecord>, StoreError> {
        self.inner.read_all().await
    }

    fn backend(&self) -> &'static str {
        "counting"
    }
}

fn chat_source() -> MessageSource {
    MessageSource::from_messages(["gg ez", "POGGERS that was insane"])
}

fn session(seed: u64) -> AnnotationSession {
    AnnotationSession::with_rng(500, StdRng::seed_from_u64(seed))
}

// =============================================================================
// Successful submission
// =============================================================================

#[tokio::test]
async fn test_select_then_submit_records_label() {
    let source = chat_source();
    let store = MemoryLabelStore::new();
    let mut session = session(42);

    let staged = session.select_next(&source).cloned().expect("item staged");
    assert!(source.messages().contains(&staged.message));
    assert!((MESSAGE_ID_MIN..=MESSAGE_ID_MAX).contains(&staged.message_id));

    let record = session
        .submit("Excitement", 5, "Alice", &store)
        .await
        .expect("submit succeeds");

    assert_eq!(session.labeled_count(), 1);
    assert!(session.current_item().is_none());

    let stored = store.read_all().await.unwrap();
    assert_eq!(stored, vec![record.clone()]);
    assert_eq!(record.message_id, staged.message_id);
    assert_eq!(record.message, staged.message);
    assert_eq!(record.sentiment, Sentiment::Excitement);
    assert_eq!(record.confidence.value(), 5);
    assert_eq!(record.labeled_by, "Alice");
}

#[tokio::test]
async fn test_every_valid_pair_increments_once() {
    let source = chat_source();
    let store = MemoryLabelStore::new();
    let mut session = session(7);
    let mut expected = 0;

    for sentiment in Sentiment::ALL {
        for confidence in 1..=5 {
            session.select_next(&source);
            session
                .submit(sentiment.as_str(), confidence, "Alice", &store)
                .await
                .unwrap();
            expected += 1;

            assert_eq!(session.labeled_count(), expected);
            assert!(session.current_item().is_none());
        }
    }

    assert_eq!(store.read_all().await.unwrap().len(), 30);
}

#[tokio::test]
async fn test_sequential_submits_keep_call_order() {
    let source = chat_source();
    let store = MemoryLabelStore::new();
    let mut session = session(9);

    session.select_next(&source);
    let first = session.submit("Humor", 2, "Alice", &store).await.unwrap();
    session.select_next(&source);
    let second = session.submit("Boredom", 4, "Bob", &store).await.unwrap();

    let stored = store.read_all().await.unwrap();
    assert_eq!(stored, vec![first, second]);
    assert!(stored[0].timestamp <= stored[1].timestamp);
}

// =============================================================================
// Store failure keeps the item staged
// =============================================================================

#[tokio::test]
async fn test_store_failure_leaves_state_unchanged() {
    let source = chat_source();
    let mut session = session(1);
    session.select_next(&source);
    let before = session.state().clone();

    let result = session.submit("Humor", 3, "Bob", &UnavailableStore).await;

    assert!(matches!(
        result,
        Err(Error::StoreWriteFailed(StoreError::Unavailable(_)))
    ));
    assert_eq!(session.state(), &before);
    assert_eq!(session.labeled_count(), 0);
    assert!(session.current_item().is_some());
}

#[tokio::test]
async fn test_retry_after_store_failure_succeeds() {
    let source = chat_source();
    let store = MemoryLabelStore::new();
    let mut session = session(2);
    let staged = session.select_next(&source).cloned().unwrap();

    assert!(session.submit("Humor", 3, "Bob", &UnavailableStore).await.is_err());
    let record = session.submit("Humor", 3, "Bob", &store).await.unwrap();

    assert_eq!(record.message_id, staged.message_id);
    assert_eq!(session.labeled_count(), 1);
}

// =============================================================================
// Validation failures never call the store
// =============================================================================

#[tokio::test]
async fn test_submit_without_staged_item() {
    let store = CountingStore::default();
    let mut session = session(3);

    let result = session.submit("Neutral", 3, "Alice", &store).await;

    assert!(matches!(result, Err(Error::NoActiveItem)));
    assert_eq!(store.appends.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_submit_after_skip_has_no_active_item() {
    let store = CountingStore::default();
    let mut session = session(4);
    session.select_next(&chat_source());
    session.skip();

    let result = session.submit("Neutral", 3, "Alice", &store).await;

    assert!(matches!(result, Err(Error::NoActiveItem)));
    assert_eq!(store.appends.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_sentiment_regardless_of_store() {
    for bad in ["Joy", "excitement", "", "Select..."] {
        let mut session = session(5);
        session.select_next(&chat_source());
        let before = session.state().clone();

        let ok_store = CountingStore::default();
        let result = session.submit(bad, 3, "Alice", &ok_store).await;
        assert!(matches!(result, Err(Error::InvalidSentiment(ref s)) if s == bad));
        assert_eq!(ok_store.appends.load(Ordering::SeqCst), 0);

        let result = session.submit(bad, 3, "Alice", &UnavailableStore).await;
        assert!(matches!(result, Err(Error::InvalidSentiment(_))));
        assert_eq!(session.state(), &before);
    }
}

#[tokio::test]
async fn test_invalid_confidence() {
    for bad in [0, 6, -1, 100] {
        let store = CountingStore::default();
        let mut session = session(6);
        session.select_next(&chat_source());
        let before = session.state().clone();

        let result = session.submit("Confusion", bad, "Alice", &store).await;

        assert!(matches!(result, Err(Error::InvalidConfidence(c)) if c == bad));
        assert_eq!(store.appends.load(Ordering::SeqCst), 0);
        assert_eq!(session.state(), &before);
    }
}

// =============================================================================
// Skip and select
// =============================================================================

#[test]
fn test_repeated_skip() {
    let mut session = session(8);
    session.select_next(&chat_source());

    for _ in 0..5 {
        session.skip();
        assert!(session.current_item().is_none());
        assert_eq!(session.labeled_count(), 0);
    }
}

#[test]
fn test_select_next_samples_with_replacement() {
    let source = MessageSource::from_messages(["only message"]);
    let mut session = session(10);

    let first = session.select_next(&source).cloned().unwrap();
    let second = session.select_next(&source).cloned().unwrap();

    assert_eq!(first.message, second.message);
    assert_eq!(session.labeled_count(), 0);
}
