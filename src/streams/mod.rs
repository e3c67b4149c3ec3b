//! Stream definitions and catalogs
//!
//! # Overview
//!
//! Every stream the connector serves is described statically by a
//! [`StreamDef`]: where its endpoint lives (account-global or per
//! project), how it syncs (full refresh or incremental on a timestamp
//! watermark), its primary key, and how its records are reshaped. The
//! read engine composes strategies from these capabilities instead of
//! special-casing streams.
//!
//! Catalog types wrap the definitions for hosts: [`Catalog`] is what
//! discovery returns, [`ConfiguredCatalog`] is what a read runs.

mod catalog;
mod registry;
mod types;

pub use catalog::{Catalog, CatalogStream, ConfiguredCatalog, ConfiguredStream};
pub use registry::{get, names, STREAMS};
pub use types::{RecordShape, StreamDef, StreamMode, StreamScope};
