//! Message sources
//!
//! A `MessageSource` is the in-memory collection the session samples from.
//! It is filled once per run by a `MessageFetcher`: the Hugging Face
//! datasets-server rows API or a local text file.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{Error, Result};

const USER_AGENT: &str = concat!("tsl-labeler/", env!("CARGO_PKG_VERSION"));

/// Default datasets-server endpoint
pub const HUGGING_FACE_ENDPOINT: &str = "https://datasets-server.huggingface.co";

/// Largest page the rows API serves
const ROWS_PAGE_SIZE: usize = 100;

/// Bulk fetch of raw chat messages
#[async_trait]
pub trait MessageFetcher: Send + Sync {
    /// Fetch the whole collection; any failure fails the whole fetch
    async fn fetch_all(&self) -> Result<Vec<String>>;

    /// Short human-readable description for logs
    fn describe(&self) -> String;
}

/// Fetched messages available for sampling
#[derive(Debug, Clone, Default)]
pub struct MessageSource {
    messages: Vec<String>,
}

impl MessageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from an already-fetched collection
    pub fn from_messages<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    /// Replace the collection with a fresh fetch
    ///
    /// On failure the source is left empty; there is no fallback to the
    /// previously fetched collection.
    pub async fn load(&mut self, fetcher: &dyn MessageFetcher) -> Result<usize> {
        info!(source = %fetcher.describe(), "Fetching messages");

        match fetcher.fetch_all().await {
            Ok(messages) => {
                self.messages = messages;
                info!(count = self.messages.len(), "Message source loaded");
                Ok(self.messages.len())
            }
            Err(e) => {
                self.messages.clear();
                warn!(error = %e, "Message source fetch failed, source is empty");
                Err(match e {
                    Error::SourceFetchFailed(_) => e,
                    other => Error::SourceFetchFailed(other.to_string()),
                })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Uniform draw with replacement
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.messages.choose(rng).map(String::as_str)
    }
}

// ============================================================================
// Hugging Face datasets-server
// ============================================================================

/// One page of the rows API
#[derive(Debug, Deserialize)]
struct RowsPage {
    rows: Vec<RowEntry>,
    num_rows_total: usize,
}

#[derive(Debug, Deserialize)]
struct RowEntry {
    row: Value,
}

/// Fetches a dataset split through the datasets-server `/rows` endpoint
pub struct HuggingFaceFetcher {
    http_client: reqwest::Client,
    endpoint: String,
    dataset: String,
    config: String,
    split: String,
    max_rows: Option<usize>,
}

impl HuggingFaceFetcher {
    pub fn new(
        endpoint: impl Into<String>,
        dataset: impl Into<String>,
        config: impl Into<String>,
        split: impl Into<String>,
        max_rows: Option<usize>,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::SourceFetchFailed(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            dataset: dataset.into(),
            config: config.into(),
            split: split.into(),
            max_rows,
        })
    }

    async fn fetch_page(&self, offset: usize, length: usize) -> Result<RowsPage> {
        let url = format!("{}/rows", self.endpoint);
        debug!(dataset = %self.dataset, offset, length, "Fetching rows page");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("dataset", self.dataset.as_str()),
                ("config", self.config.as_str()),
                ("split", self.split.as_str()),
            ])
            .query(&[("offset", offset), ("length", length)])
            .send()
            .await
            .map_err(|e| Error::SourceFetchFailed(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::SourceFetchFailed(format!(
                "API error {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        response
            .json::<RowsPage>()
            .await
            .map_err(|e| Error::SourceFetchFailed(format!("Parse error: {}", e)))
    }
}

/// Message text of a dataset row: `message`, else `text`, else the whole row
pub fn message_text(row: &Value) -> String {
    ["message", "text"]
        .iter()
        .find_map(|key| row.get(*key))
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| row.to_string())
}

#[async_trait]
impl MessageFetcher for HuggingFaceFetcher {
    async fn fetch_all(&self) -> Result<Vec<String>> {
        let mut messages = Vec::new();
        let mut offset = 0;

        loop {
            let remaining = self
                .max_rows
                .map(|max| max.saturating_sub(messages.len()))
                .unwrap_or(ROWS_PAGE_SIZE);
            if remaining == 0 {
                break;
            }

            let page = self.fetch_page(offset, remaining.min(ROWS_PAGE_SIZE)).await?;
            if page.rows.is_empty() {
                break;
            }

            offset += page.rows.len();
            messages.extend(page.rows.iter().map(|entry| message_text(&entry.row)));

            if offset >= page.num_rows_total {
                break;
            }
        }

        if let Some(max) = self.max_rows {
            messages.truncate(max);
        }

        Ok(messages)
    }

    fn describe(&self) -> String {
        format!("huggingface:{}/{}/{}", self.dataset, self.config, self.split)
    }
}

// ============================================================================
// Local text file
// ============================================================================

/// Reads one message per non-empty line
pub struct TextFileFetcher {
    path: PathBuf,
}

impl TextFileFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MessageFetcher for TextFileFetcher {
    async fn fetch_all(&self) -> Result<Vec<String>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::SourceFetchFailed(format!("{}: {}", self.path.display(), e))
        })?;

        Ok(content
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    struct BrokenFetcher;

    #[async_trait]
    impl MessageFetcher for BrokenFetcher {
        async fn fetch_all(&self) -> Result<Vec<String>> {
            Err(Error::SourceFetchFailed("connection refused".to_string()))
        }

        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    #[test]
    fn test_message_text_prefers_message_field() {
        let row = json!({"message": "POGGERS", "text": "ignored"});
        assert_eq!(message_text(&row), "POGGERS");
    }

    #[test]
    fn test_message_text_falls_back_to_text_then_row() {
        assert_eq!(message_text(&json!({"text": "gg ez"})), "gg ez");
        assert_eq!(message_text(&json!({"user": "a"})), r#"{"user":"a"}"#);
    }

    #[test]
    fn test_choose_on_empty_source() {
        let source = MessageSource::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(source.choose(&mut rng).is_none());
    }

    #[test]
    fn test_choose_draws_from_collection() {
        let source = MessageSource::from_messages(["a", "b", "c"]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let drawn = source.choose(&mut rng).unwrap();
            assert!(["a", "b", "c"].contains(&drawn));
        }
    }

    #[tokio::test]
    async fn test_failed_load_empties_source() {
        let mut source = MessageSource::from_messages(["stale"]);
        let result = source.load(&BrokenFetcher).await;

        assert!(matches!(result, Err(Error::SourceFetchFailed(_))));
        assert!(source.is_empty());
    }

    #[tokio::test]
    async fn test_text_file_fetcher_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.txt");
        std::fs::write(&path, "gg ez\n\n   \nPOGGERS that was insane\r\n").unwrap();

        let messages = TextFileFetcher::new(&path).fetch_all().await.unwrap();
        assert_eq!(messages, vec!["gg ez", "POGGERS that was insane"]);
    }

    #[tokio::test]
    async fn test_text_file_fetcher_missing_file() {
        let result = TextFileFetcher::new("/nonexistent/messages.txt")
            .fetch_all()
            .await;
        assert!(matches!(result, Err(Error::SourceFetchFailed(_))));
    }
}
