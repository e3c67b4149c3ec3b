//! HTTP transport for the Tracker API
//!
//! Every request the connector makes goes through [`HttpClient`]: it
//! resolves paths against the API root, attaches the token header,
//! paces requests through a token bucket, and retries transient
//! failures with a configurable backoff schedule.

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
