//! Record extraction types and traits

use crate::error::Result;
use crate::types::{JsonObject, JsonValue};

/// Trait for turning a response body into records
///
/// Implementations fail on bodies that do not have the expected
/// shape; a response that parses as JSON but is not a list of
/// objects is a broken contract, not an empty page.
pub trait RecordExtractor: Send + Sync {
    /// Extract the records from a parsed response body
    fn extract(&self, body: &JsonValue) -> Result<Vec<JsonObject>>;
}
