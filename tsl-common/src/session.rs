//! Annotation session
//!
//! Two-state cycle per item:
//!
//! ```text
//! unstaged --select_next--> staged --submit ok / skip--> unstaged
//!                             ^  |
//!                             +--+ submit failure (item kept for retry)
//! ```
//!
//! `labeled_count` only moves on a successful submit. State is per process
//! and is never persisted; only `LabelRecord`s survive a restart.

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::{Confidence, LabelRecord, Sentiment, StagedItem, MESSAGE_ID_MAX, MESSAGE_ID_MIN};
use crate::source::MessageSource;
use crate::store::LabelStore;
use crate::{time, Error, Result};

/// Default number of labels an annotator aims for per run
pub const DEFAULT_TARGET: u64 = 500;

/// Ephemeral per-run session state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub current_item: Option<StagedItem>,
    pub labeled_count: u64,
}

/// Progress toward the per-run target
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub labeled: u64,
    pub target: u64,
    /// Percentage of target reached, capped at 100
    pub percent: f64,
}

impl Progress {
    pub fn new(labeled: u64, target: u64) -> Self {
        let percent = if target == 0 {
            100.0
        } else {
            (labeled as f64 / target as f64 * 100.0).min(100.0)
        };
        Self {
            labeled,
            target,
            percent,
        }
    }
}

/// The single stateful core: one staged item and a run counter
pub struct AnnotationSession {
    state: SessionState,
    target: u64,
    rng: StdRng,
    last_timestamp: Option<NaiveDateTime>,
}

impl AnnotationSession {
    /// Create a fresh session with entropy-seeded sampling
    pub fn new(target: u64) -> Self {
        Self::with_rng(target, StdRng::from_entropy())
    }

    /// Create a fresh session with a caller-provided generator
    pub fn with_rng(target: u64, rng: StdRng) -> Self {
        Self {
            state: SessionState::default(),
            target,
            rng,
            last_timestamp: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_item(&self) -> Option<&StagedItem> {
        self.state.current_item.as_ref()
    }

    pub fn labeled_count(&self) -> u64 {
        self.state.labeled_count
    }

    pub fn progress(&self) -> Progress {
        Progress::new(self.state.labeled_count, self.target)
    }

    /// Stage a random message with a fresh display id
    ///
    /// Samples with replacement; the same text may come back within a run
    /// and ids may collide. An empty source is a no-op and returns `None`.
    pub fn select_next(&mut self, source: &MessageSource) -> Option<&StagedItem> {
        let Some(message) = source.choose(&mut self.rng) else {
            debug!("select_next on empty source ignored");
            return None;
        };

        let item = StagedItem {
            message_id: self.rng.gen_range(MESSAGE_ID_MIN..=MESSAGE_ID_MAX),
            message: message.to_string(),
        };
        info!(message_id = item.message_id, "Message staged");

        self.state.current_item = Some(item);
        self.state.current_item.as_ref()
    }

    /// Drop the staged item, if any
    pub fn skip(&mut self) {
        if let Some(item) = self.state.current_item.take() {
            info!(message_id = item.message_id, "Message skipped");
        }
    }

    /// Label the staged item and append it to `store`
    ///
    /// Validation failures never touch the store. On a store failure the
    /// session is left exactly as it was so the annotator can retry.
    pub async fn submit(
        &mut self,
        sentiment: &str,
        confidence: i64,
        labeler: &str,
        store: &dyn LabelStore,
    ) -> Result<LabelRecord> {
        let item = self.state.current_item.as_ref().ok_or(Error::NoActiveItem)?;
        let sentiment: Sentiment = sentiment
            .parse()
            .map_err(Error::InvalidSentiment)?;
        let confidence = Confidence::new(confidence).ok_or(Error::InvalidConfidence(confidence))?;

        let timestamp = self.next_timestamp();
        let record = LabelRecord {
            message_id: item.message_id,
            message: item.message.clone(),
            sentiment,
            confidence,
            labeled_by: labeler.to_string(),
            timestamp,
        };

        if let Err(e) = store.append(&record).await {
            warn!(
                message_id = record.message_id,
                error = %e,
                "Label not saved, item kept staged for retry"
            );
            return Err(Error::StoreWriteFailed(e));
        }

        self.last_timestamp = Some(timestamp);
        self.state.labeled_count += 1;
        self.state.current_item = None;

        info!(
            message_id = record.message_id,
            sentiment = %record.sentiment,
            confidence = record.confidence.value(),
            labeled_by = %record.labeled_by,
            labeled_count = self.state.labeled_count,
            "Label saved"
        );

        Ok(record)
    }

    /// Current time, never earlier than the last issued timestamp
    fn next_timestamp(&self) -> NaiveDateTime {
        let now = time::now();
        match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        }
    }
}
