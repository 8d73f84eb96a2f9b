//! Google Sheets label store
//!
//! Uses the Sheets v4 REST API directly: `values:append` for appends and a
//! `values.get` over columns A:F for reads. The first sheet row is the
//! header and is never returned as a record.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::LabelStore;
use crate::models::{LabelRecord, COLUMNS};
use crate::time::format_timestamp;
use crate::StoreError;

/// Default Sheets API endpoint
pub const SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com";

const USER_AGENT: &str = concat!("tsl-labeler/", env!("CARGO_PKG_VERSION"));

/// `values.get` response body
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Label store backed by one worksheet of a shared spreadsheet
pub struct SheetsLabelStore {
    http_client: reqwest::Client,
    endpoint: Url,
    spreadsheet_id: String,
    sheet_name: String,
    access_token: Option<String>,
}

impl SheetsLabelStore {
    /// Connect to the worksheet, writing the header row if it is empty
    pub async fn connect(
        endpoint: &str,
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        access_token: Option<String>,
    ) -> Result<Self, StoreError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        let endpoint = Url::parse(endpoint)
            .map_err(|e| StoreError::Unavailable(format!("Invalid endpoint {}: {}", endpoint, e)))?;

        let store = Self {
            http_client,
            endpoint,
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            access_token,
        };

        let header = store.get_values(&format!("{}!A1:F1", store.sheet_name)).await?;
        if header.is_empty() {
            store.append_row(COLUMNS.iter().map(|c| json!(c)).collect()).await?;
            info!(sheet = %store.sheet_name, "Wrote header row to empty sheet");
        }

        info!(
            spreadsheet = %store.spreadsheet_id,
            sheet = %store.sheet_name,
            "Connected to Google Sheets"
        );
        Ok(store)
    }

    fn data_range(&self) -> String {
        format!("{}!A:F", self.sheet_name)
    }

    /// `{endpoint}/v4/spreadsheets/{id}/values/{range}{suffix}`
    fn values_url(&self, range_with_suffix: &str) -> Result<Url, StoreError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Unavailable(format!("Invalid endpoint {}", self.endpoint)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range_with_suffix]);
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(StoreError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_values(&self, range: &str) -> Result<Vec<Vec<Value>>, StoreError> {
        let url = self.values_url(range)?;
        debug!(url = %url, "Reading sheet values");

        let response = self.authorize(self.http_client.get(url)).send().await?;
        let body: ValueRange = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(body.values)
    }

    async fn append_row(&self, row: Vec<Value>) -> Result<(), StoreError> {
        let url = self.values_url(&format!("{}:append", self.data_range()))?;
        debug!(url = %url, "Appending sheet row");

        let request = self
            .http_client
            .post(url)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": [row] }));

        let response = self.authorize(request).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }
}

/// Sheet cells come back as strings or numbers depending on render options
fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl LabelStore for SheetsLabelStore {
    async fn append(&self, record: &LabelRecord) -> Result<(), StoreError> {
        self.append_row(vec![
            json!(record.message_id),
            json!(record.message),
            json!(record.sentiment.as_str()),
            json!(record.confidence.value()),
            json!(record.labeled_by),
            json!(format_timestamp(&record.timestamp)),
        ])
        .await
    }

    async fn read_all(&self) -> Result<Vec<LabelRecord>, StoreError> {
        let rows = self.get_values(&self.data_range()).await?;

        let mut records = Vec::with_capacity(rows.len().saturating_sub(1));
        for (index, row) in rows.iter().enumerate().skip(1) {
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            match LabelRecord::from_row(&cells) {
                Ok(record) => records.push(record),
                Err(reason) => {
                    warn!(sheet = %self.sheet_name, row = index + 1, %reason, "Skipping malformed row")
                }
            }
        }

        Ok(records)
    }

    fn backend(&self) -> &'static str {
        "sheets"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!("gg")), "gg");
        assert_eq!(cell_text(&json!(12345)), "12345");
        assert_eq!(cell_text(&Value::Null), "");
    }
}
