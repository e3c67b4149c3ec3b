//! Record extraction module
//!
//! Tracker list endpoints return a bare JSON array of objects, so
//! extraction is mostly a typed unwrap of the response body. The one
//! exception is the activity feed, whose records carry their owning
//! project as a nested object that gets lifted into a top-level field.

mod extractors;
mod types;

pub use extractors::{ActivityExtractor, RootArrayExtractor, PROJECT_ID_FIELD};
pub use types::RecordExtractor;
