//! Record extractor implementations

use super::types::RecordExtractor;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};

/// Field injected into activity records with the owning project id
pub const PROJECT_ID_FIELD: &str = "project_id";

// ============================================================================
// Root Array Extractor
// ============================================================================

/// Extractor for endpoints that return a bare JSON array of objects
#[derive(Debug, Clone, Copy, Default)]
pub struct RootArrayExtractor;

impl RootArrayExtractor {
    /// Create a new root array extractor
    pub fn new() -> Self {
        Self
    }
}

impl RecordExtractor for RootArrayExtractor {
    fn extract(&self, body: &JsonValue) -> Result<Vec<JsonObject>> {
        let items = body
            .as_array()
            .ok_or_else(|| Error::decode("expected a JSON array of records"))?;

        items
            .iter()
            .map(|item| {
                item.as_object().cloned().ok_or_else(|| {
                    Error::decode(format!("expected a JSON object record, got: {item}"))
                })
            })
            .collect()
    }
}

// ============================================================================
// Activity Extractor
// ============================================================================

/// Extractor for the activity feed
///
/// Activity records reference their project as a nested object. The
/// extractor lifts `project.id` into a top-level `project_id` field so
/// activity rows can be keyed and filtered like every other
/// project-scoped record. The nested object is left in place, and
/// records without one pass through unmodified.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityExtractor {
    inner: RootArrayExtractor,
}

impl ActivityExtractor {
    /// Create a new activity extractor
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordExtractor for ActivityExtractor {
    fn extract(&self, body: &JsonValue) -> Result<Vec<JsonObject>> {
        let mut records = self.inner.extract(body)?;

        for record in &mut records {
            let project_id = record
                .get("project")
                .and_then(|project| project.get("id"))
                .cloned();
            if let Some(project_id) = project_id {
                record.insert(PROJECT_ID_FIELD.to_string(), project_id);
            }
        }

        Ok(records)
    }
}
