//! Local CSV label file
//!
//! Each append is encoded into a buffer first and written with one
//! `write_all` on a file opened in append mode, so concurrent writers
//! (other processes on the same file) never interleave partial rows.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::LabelStore;
use crate::models::{LabelRecord, COLUMNS};
use crate::StoreError;

/// Label store backed by a CSV file with a header row
pub struct CsvLabelStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvLabelStore {
    /// Open the file, creating it (and its header) if absent or empty
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        if needs_header(&path).await? {
            let header = encode_row(&COLUMNS)?;
            append_bytes(&path, &header).await?;
            info!(path = %path.display(), "Created label file");
        } else {
            debug!(path = %path.display(), "Using existing label file");
        }

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Encode one CSV row, terminator included
fn encode_row<S: AsRef<str>>(fields: &[S]) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(fields.iter().map(|f| f.as_ref()))?;
    writer
        .into_inner()
        .map_err(|e| StoreError::Io(e.into_error()))
}

/// True when the file is absent or has no content
async fn needs_header(path: &Path) -> Result<bool, StoreError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.len() == 0),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(e.into()),
    }
}

async fn append_bytes(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.sync_data().await?;
    Ok(())
}

#[async_trait]
impl LabelStore for CsvLabelStore {
    async fn append(&self, record: &LabelRecord) -> Result<(), StoreError> {
        let row = encode_row(&record.to_row())?;

        let _guard = self.write_lock.lock().await;

        // File removed or truncated since open(): restore the header in the
        // same write as the row
        let bytes = if needs_header(&self.path).await? {
            warn!(path = %self.path.display(), "Label file missing or empty, rewriting header");
            let mut bytes = encode_row(&COLUMNS)?;
            bytes.extend_from_slice(&row);
            bytes
        } else {
            row
        };

        append_bytes(&self.path, &bytes).await?;
        debug!(path = %self.path.display(), message_id = record.message_id, "Row appended");
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<LabelRecord>, StoreError> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::Unavailable(format!(
                    "{} not found",
                    self.path.display()
                )))
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_slice());

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let parsed = row
                .map_err(|e| e.to_string())
                .and_then(|row| LabelRecord::from_row(&row.iter().collect::<Vec<_>>()));
            match parsed {
                Ok(record) => records.push(record),
                Err(reason) => {
                    warn!(path = %self.path.display(), row = index + 1, %reason, "Skipping malformed row")
                }
            }
        }

        Ok(records)
    }

    fn backend(&self) -> &'static str {
        "csv"
    }
}
