//! Label stores
//!
//! Append-only sinks for completed `LabelRecord`s. The session only sees the
//! `LabelStore` trait, so the CSV, Sheets and in-memory backends are
//! interchangeable.

use async_trait::async_trait;

use crate::models::LabelRecord;
use crate::StoreError;

mod csv_file;
mod memory;
mod sheets;

pub use csv_file::CsvLabelStore;
pub use memory::MemoryLabelStore;
pub use sheets::{SheetsLabelStore, SHEETS_ENDPOINT};

/// Append-only record sink
#[async_trait]
pub trait LabelStore: Send + Sync {
    /// Durably record one label
    ///
    /// Must not drop or reorder records relative to other appends from the
    /// same process, and must not leave a partial row on failure.
    async fn append(&self, record: &LabelRecord) -> Result<(), StoreError>;

    /// Every record currently visible, in store order
    async fn read_all(&self) -> Result<Vec<LabelRecord>, StoreError>;

    /// Backend name for logs and the UI
    fn backend(&self) -> &'static str;
}
