//! # TSL Common Library
//!
//! Shared code for the Twitch Sentiment Labeler including:
//! - Label data model (sentiment categories, confidence scale, records)
//! - Annotation session state machine
//! - Message sources (Hugging Face dataset, local text file)
//! - Label stores (CSV file, Google Sheets, in-memory)
//! - Statistics aggregation over stored labels
//! - Configuration loading

pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod source;
pub mod stats;
pub mod store;
pub mod time;

pub use error::{Error, Result, StoreError};
pub use models::{Confidence, LabelRecord, Sentiment, StagedItem};
pub use session::{AnnotationSession, Progress, SessionState};
pub use source::{MessageFetcher, MessageSource};
pub use stats::LabelStats;
pub use store::LabelStore;
