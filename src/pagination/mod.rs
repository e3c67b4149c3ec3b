//! Header-driven pagination
//!
//! The Tracker API paginates list endpoints through response headers
//! rather than an envelope in the body. Each response carries
//! `X-Tracker-Pagination-*` headers describing the window that was
//! served; the next request repeats the query with an advanced
//! `offset` parameter.
//!
//! Endpoints that do not paginate simply omit the headers, so the
//! same strategy handles both cases: a response without the total
//! header is the last (and only) page.

mod strategies;
mod types;

pub use strategies::{
    HeaderPaginator, OFFSET_PARAM, PAGINATION_LIMIT_HEADER, PAGINATION_OFFSET_HEADER,
    PAGINATION_RETURNED_HEADER, PAGINATION_TOTAL_HEADER,
};
pub use types::{NextPage, PaginationState, Paginator};
