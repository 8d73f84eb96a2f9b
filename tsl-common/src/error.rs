//! Common error types for TSL

use thiserror::Error;

/// Common result type for TSL operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by session, source and configuration operations
///
/// None of these are fatal: every failure leaves the session idle or staged
/// so the annotator can try again.
#[derive(Error, Debug)]
pub enum Error {
    /// Message source could not be fetched or parsed; the source is left empty
    #[error("Message source fetch failed: {0}")]
    SourceFetchFailed(String),

    /// Submit called while no item is staged
    #[error("No message is staged for labeling")]
    NoActiveItem,

    /// Sentiment outside the fixed category set
    #[error("Invalid sentiment: {0:?}")]
    InvalidSentiment(String),

    /// Confidence outside [1,5]
    #[error("Invalid confidence: {0} (expected 1-5)")]
    InvalidConfidence(i64),

    /// Label store rejected an append; the staged item is kept for retry
    #[error("Label store write failed: {0}")]
    StoreWriteFailed(#[source] StoreError),

    /// Label store could not be read
    #[error("Label store read failed: {0}")]
    StoreReadFailed(#[source] StoreError),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Label store backend failures
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Local file error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding or decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Remote backend answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Stored row does not match the six-column layout
    #[error("Malformed row: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}
