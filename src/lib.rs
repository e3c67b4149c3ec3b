// Pedantic clippy lints this codebase opts out of
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Pivotal Tracker Source Connector
//!
//! A Rust-native source connector for the Pivotal Tracker REST API (v5).
//! It implements the four standard source operations (`spec`, `check`,
//! `discover`, `read`) and emits protocol messages any host can consume
//! as newline-delimited JSON.
//!
//! Seven streams are exposed. `projects` lists every project the token
//! can reach; the other six (`stories`, `project_memberships`, `labels`,
//! `releases`, `epics`, `activity`) fan out with one slice per accessible
//! project. `stories` and `activity` sync incrementally behind timestamp
//! watermarks; the rest are full refresh.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use tracker_source::config::SourceConfig;
//! use tracker_source::source::{Source, TrackerSource};
//! use tracker_source::streams::ConfiguredCatalog;
//!
//! #[tokio::main]
//! async fn main() -> tracker_source::Result<()> {
//!     let config = SourceConfig::new("your-api-token");
//!     let source = TrackerSource::new();
//!
//!     source.check(&config).await?;
//!
//!     let catalog = ConfiguredCatalog::select_all();
//!     let mut messages = source.read(&config, &catalog, None).await?;
//!     while let Some(message) = messages.next().await {
//!         println!("{}", message.to_json());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## How a read runs
//!
//! ```text
//! read(catalog, state)
//!  └─ discover accessible projects (list, then probe each)
//!      └─ for each configured stream
//!           └─ for each project slice
//!                └─ page through X-Tracker-Pagination-* headers,
//!                   drop records at or before the cursor,
//!                   emit RECORD messages,
//!                   checkpoint STATE at the slice boundary
//! ```
//!
//! Every request carries the `X-TrackerToken` header. A shared transport
//! enforces a client-side rate limit and retries transient failures with
//! backoff; throttling responses wait out the server's `Retry-After`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Modules
// ============================================================================

/// Error types for the connector
pub mod error;

/// Shared vocabulary types and aliases
pub mod types;

/// Token authentication
pub mod auth;

/// HTTP transport with retry, backoff, and rate limiting
pub mod http;

/// Pagination driven by response headers
pub mod pagination;

/// Record extraction from API responses
pub mod records;

/// Per-project stream slices
pub mod slices;

/// Incremental cursor tracking
pub mod cursor;

/// Persisted sync state and checkpointing
pub mod state;

/// Stream definitions and catalog
pub mod streams;

/// Accessible-project discovery
pub mod discovery;

/// The read loop
pub mod engine;

/// Source configuration
pub mod config;

/// Source trait and the Tracker implementation
pub mod source;

/// Command-line entry points
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// The types most callers start from
pub use config::SourceConfig;
pub use source::{Message, Source, TrackerSource};

/// Connector version, from the package manifest
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Connector name, from the package manifest
pub const NAME: &str = env!("CARGO_PKG_NAME");
