//! Cursor tracker implementation

use crate::error::{Error, Result};
use crate::types::JsonObject;
use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

/// Watermark used before any state exists
pub const CURSOR_EPOCH: &str = "1970-01-01T00:00:00";

/// High-water mark over a timestamp field of a stream's records
///
/// The API emits cursor timestamps in a uniform ISO-8601 format, so
/// values observed on records are compared as plain strings. Values
/// arriving from persisted state are not trusted: they are parsed and
/// normalized before use, and rejected when unparseable.
#[derive(Debug, Clone)]
pub struct CursorTracker {
    cursor_field: String,
    filter_param: String,
    value: Option<String>,
}

impl CursorTracker {
    /// Create an unset tracker for the given cursor field
    pub fn new(cursor_field: impl Into<String>, filter_param: impl Into<String>) -> Self {
        Self {
            cursor_field: cursor_field.into(),
            filter_param: filter_param.into(),
            value: None,
        }
    }

    /// The record field this tracker watches
    pub fn cursor_field(&self) -> &str {
        &self.cursor_field
    }

    /// The query parameter carrying the watermark on requests
    pub fn filter_param(&self) -> &str {
        &self.filter_param
    }

    /// The current watermark, or the epoch when unset
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or(CURSOR_EPOCH)
    }

    /// Seed the tracker from persisted stream state
    ///
    /// The persisted shape is `{<cursor_field>: <timestamp>}`; a state
    /// object without the field leaves the tracker unset.
    pub fn set_state(&mut self, state: &JsonObject) -> Result<()> {
        match state.get(&self.cursor_field) {
            Some(Value::String(raw)) => {
                self.value = Some(normalize_seed(raw)?);
                Ok(())
            }
            Some(other) => Err(Error::state(format!(
                "cursor value for {} is not a string: {other}",
                self.cursor_field
            ))),
            None => Ok(()),
        }
    }

    /// Query parameters filtering a request to records at or after the watermark
    pub fn filter_params(&self) -> Vec<(String, String)> {
        vec![(self.filter_param.clone(), self.value().to_string())]
    }

    /// Advance the watermark past a record
    ///
    /// The watermark only moves forward: records may arrive out of
    /// order within a page, and the cursor must end at the maximum.
    /// Records without a string cursor value leave it untouched.
    pub fn advance(&mut self, record: &JsonObject) {
        let Some(observed) = record.get(&self.cursor_field).and_then(Value::as_str) else {
            return;
        };

        match &self.value {
            Some(current) if current.as_str() >= observed => {}
            _ => self.value = Some(observed.to_string()),
        }
    }

    /// Snapshot the watermark in the persisted state shape
    ///
    /// An unset tracker snapshots to an empty object, matching the
    /// state of a stream that has never synced.
    pub fn snapshot(&self) -> JsonObject {
        let mut state = JsonObject::new();
        if let Some(value) = &self.value {
            state.insert(self.cursor_field.clone(), Value::String(value.clone()));
        }
        state
    }
}

/// Parse and normalize a cursor seed from outside the API
fn normalize_seed(raw: &str) -> Result<String> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|_| Error::state(format!("invalid cursor timestamp: {raw:?}")))?;
    Ok(parsed.format("%Y-%m-%dT%H:%M:%S").to_string())
}
