//! Slice types and traits

use serde::{Deserialize, Serialize};

/// A unit of work for one fetch pass over a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSlice {
    /// Project the slice is scoped to, absent for account-level streams
    pub project_id: Option<u64>,
}

impl StreamSlice {
    /// The single slice of an account-level stream
    pub fn global() -> Self {
        Self { project_id: None }
    }

    /// A slice scoped to one project
    pub fn for_project(project_id: u64) -> Self {
        Self {
            project_id: Some(project_id),
        }
    }
}

/// Trait for producing the slices of a stream
pub trait SliceGenerator: Send + Sync {
    /// The slices to fetch, in order
    fn slices(&self) -> Vec<StreamSlice>;
}
