//! Timestamp utilities
//!
//! Label timestamps are wall-clock local time at second resolution, written
//! as `YYYY-MM-DD HH:MM:SS` in every backend.

use chrono::{Local, NaiveDateTime};

/// Persisted timestamp format
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Get current local timestamp, truncated to whole seconds
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    // Round-trip through the persisted format so the in-memory value equals
    // what read_all() returns later.
    parse_timestamp(&format_timestamp(&now)).unwrap_or(now)
}

/// Render a timestamp in the persisted format
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp from the persisted format
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).ok()
}

/// Serde adapter for `NaiveDateTime` fields in the persisted format
pub mod serde_timestamp {
    use super::{format_timestamp, parse_timestamp};
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}
