//! Pagination strategy implementation
//!
//! The Tracker API reports pagination through `X-Tracker-Pagination-*`
//! response headers.

use super::types::{NextPage, PaginationState, Paginator};
use crate::error::{Error, Result};
use reqwest::header::HeaderMap;

/// Header carrying the total number of records matching the query
pub const PAGINATION_TOTAL_HEADER: &str = "X-Tracker-Pagination-Total";

/// Header carrying the page size the server applied
pub const PAGINATION_LIMIT_HEADER: &str = "X-Tracker-Pagination-Limit";

/// Header echoing the offset of the served window
pub const PAGINATION_OFFSET_HEADER: &str = "X-Tracker-Pagination-Offset";

/// Header carrying the number of records in this response
pub const PAGINATION_RETURNED_HEADER: &str = "X-Tracker-Pagination-Returned";

/// Query parameter for requesting a window at an offset
pub const OFFSET_PARAM: &str = "offset";

/// Paginator driven by the `X-Tracker-Pagination-*` response headers
///
/// A response without the total header is the final page: endpoints
/// that do not paginate never send the headers at all. When the total
/// header is present, a full window (`returned == limit`) means more
/// records may follow at `offset + limit`; a partial window ends the
/// stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderPaginator;

impl HeaderPaginator {
    /// Create a new header paginator
    pub fn new() -> Self {
        Self
    }
}

impl Paginator for HeaderPaginator {
    fn initial_params(&self, state: &PaginationState) -> Vec<(String, String)> {
        if state.offset > 0 {
            vec![(OFFSET_PARAM.to_string(), state.offset.to_string())]
        } else {
            Vec::new()
        }
    }

    fn process_response(
        &self,
        headers: &HeaderMap,
        records_count: usize,
        state: &mut PaginationState,
    ) -> Result<NextPage> {
        state.add_fetched(records_count as u64);
        state.next_page();

        if !headers.contains_key(PAGINATION_TOTAL_HEADER) {
            state.mark_done();
            return Ok(NextPage::Done);
        }

        let limit = required_count_header(headers, PAGINATION_LIMIT_HEADER)?;
        let offset = required_count_header(headers, PAGINATION_OFFSET_HEADER)?;
        let returned = required_count_header(headers, PAGINATION_RETURNED_HEADER)?;

        // A full window may be followed by more records. A zero limit
        // cannot make progress, so it terminates as well.
        if returned == limit && limit > 0 {
            let next_offset = offset + limit;
            state.offset = next_offset;
            Ok(NextPage::with_param(OFFSET_PARAM, next_offset.to_string()))
        } else {
            state.mark_done();
            Ok(NextPage::Done)
        }
    }
}

/// Read a numeric pagination header, failing if absent or malformed
fn required_count_header(headers: &HeaderMap, name: &str) -> Result<u64> {
    let raw = headers
        .get(name)
        .ok_or_else(|| Error::pagination(format!("response is missing the {name} header")))?;
    let text = raw
        .to_str()
        .map_err(|_| Error::pagination(format!("{name} header is not valid UTF-8")))?;
    text.parse::<u64>()
        .map_err(|_| Error::pagination(format!("{name} header is not an integer: {text:?}")))
}
