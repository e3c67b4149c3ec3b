//! Stream slicing module
//!
//! Most Tracker streams are read once per accessible project: the
//! same endpoint shape is fetched under each project's path prefix.
//! A slice names the project a fetch pass is scoped to; account-level
//! streams have a single unscoped slice.

mod generators;
mod types;

pub use generators::{ProjectSlices, SingleSlice};
pub use types::{SliceGenerator, StreamSlice};
