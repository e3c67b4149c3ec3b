//! Incremental cursor module
//!
//! Incremental streams track a high-water mark over a timestamp field
//! on their records. The tracker seeds each sync from persisted state,
//! advances as records flow past, and snapshots back into the shape
//! the state store persists.

mod tracker;

pub use tracker::{CursorTracker, CURSOR_EPOCH};
