//! Paging abstractions used by the fetch loop

use crate::error::Result;
use reqwest::header::HeaderMap;

/// Verdict after inspecting one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Fetch another page with these query parameters
    Continue {
        /// Parameters to add or replace on the next request
        query_params: Vec<(String, String)>,
    },
    /// The window is exhausted
    Done,
}

impl NextPage {
    /// Continuation carrying several parameters
    pub fn with_params(params: Vec<(String, String)>) -> Self {
        Self::Continue {
            query_params: params,
        }
    }

    /// Continuation carrying a single parameter
    pub fn with_param(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Continue {
            query_params: vec![(key.into(), value.into())],
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }
}

/// Progress through one paginated listing
///
/// The fetch loop owns one of these per slice and threads it through
/// [`Paginator::process_response`] so the strategy can advance the
/// offset and stop the loop.
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Offset the next request should ask for
    pub offset: u64,
    /// Pages fetched so far
    pub pages: u32,
    /// Records fetched so far across all pages
    pub total_fetched: u64,
    /// No further pages remain
    pub done: bool,
}

impl PaginationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_done(&mut self) {
        self.done = true;
    }

    pub fn next_page(&mut self) {
        self.pages += 1;
    }

    pub fn add_fetched(&mut self, count: u64) {
        self.total_fetched += count;
    }
}

/// Strategy deciding how a listing is walked
///
/// Implementations seed the first request through
/// [`initial_params`](Self::initial_params), then judge every
/// response: continue with new parameters, or stop.
pub trait Paginator: Send + Sync {
    /// Query parameters for the first request of a listing
    fn initial_params(&self, state: &PaginationState) -> Vec<(String, String)>;

    /// Inspect one response and decide whether a page follows
    ///
    /// Fails when the response advertises pagination but the headers
    /// are incomplete or malformed.
    fn process_response(
        &self,
        headers: &HeaderMap,
        records_count: usize,
        state: &mut PaginationState,
    ) -> Result<NextPage>;
}
