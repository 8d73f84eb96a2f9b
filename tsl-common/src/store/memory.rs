//! In-memory label store for dry runs and tests

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::LabelStore;
use crate::models::LabelRecord;
use crate::StoreError;

/// Process-local store; records are lost on exit
#[derive(Debug, Default)]
pub struct MemoryLabelStore {
    records: Mutex<Vec<LabelRecord>>,
}

impl MemoryLabelStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LabelStore for MemoryLabelStore {
    async fn append(&self, record: &LabelRecord) -> Result<(), StoreError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<LabelRecord>, StoreError> {
        Ok(self.records.lock().await.clone())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
