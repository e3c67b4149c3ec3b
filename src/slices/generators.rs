//! Slice generator implementations

use super::types::{SliceGenerator, StreamSlice};

// ============================================================================
// Single Slice
// ============================================================================

/// Generator for account-level streams: one unscoped slice
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleSlice;

impl SingleSlice {
    /// Create a new single slice generator
    pub fn new() -> Self {
        Self
    }
}

impl SliceGenerator for SingleSlice {
    fn slices(&self) -> Vec<StreamSlice> {
        vec![StreamSlice::global()]
    }
}

// ============================================================================
// Project Slices
// ============================================================================

/// Generator yielding one slice per accessible project
///
/// Projects are visited in the order discovery reported them. An
/// empty project list yields no slices, which reads the stream as
/// trivially complete.
#[derive(Debug, Clone, Default)]
pub struct ProjectSlices {
    project_ids: Vec<u64>,
}

impl ProjectSlices {
    /// Create a generator over the given project ids
    pub fn new(project_ids: Vec<u64>) -> Self {
        Self { project_ids }
    }

    /// The project ids this generator covers
    pub fn project_ids(&self) -> &[u64] {
        &self.project_ids
    }
}

impl SliceGenerator for ProjectSlices {
    fn slices(&self) -> Vec<StreamSlice> {
        self.project_ids
            .iter()
            .map(|&id| StreamSlice::for_project(id))
            .collect()
    }
}
