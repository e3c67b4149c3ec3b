//! Catalog types for stream discovery and selection

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::registry;
use super::types::StreamDef;
use crate::error::Result;
use crate::types::SyncMode;

// ============================================================================
// Discovered Catalog
// ============================================================================

/// Discovered catalog (available streams)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Available streams
    pub streams: Vec<CatalogStream>,
}

impl Catalog {
    /// Catalog of every built-in stream
    pub fn built_in() -> Self {
        Self {
            streams: registry::STREAMS.iter().map(CatalogStream::from_def).collect(),
        }
    }
}

/// Stream in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStream {
    /// Stream name
    pub name: String,

    /// JSON schema for the stream
    #[serde(default)]
    pub json_schema: serde_json::Value,

    /// Supported sync modes
    #[serde(default)]
    pub supported_sync_modes: Vec<SyncMode>,

    /// Default cursor field
    #[serde(default)]
    pub default_cursor_field: Option<Vec<String>>,

    /// Source-defined primary key
    #[serde(default)]
    pub source_defined_primary_key: Option<Vec<Vec<String>>>,
}

impl CatalogStream {
    /// Build the catalog entry for a stream definition
    ///
    /// Records are emitted as returned by the API, so the schema only
    /// promises an object.
    pub fn from_def(def: &StreamDef) -> Self {
        Self {
            name: def.name.to_string(),
            json_schema: json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "type": "object",
                "additionalProperties": true,
            }),
            supported_sync_modes: def.supported_sync_modes(),
            default_cursor_field: def
                .cursor_field()
                .map(|field| vec![field.to_string()]),
            source_defined_primary_key: Some(vec![vec![def.primary_key.to_string()]]),
        }
    }
}

// ============================================================================
// Configured Catalog
// ============================================================================

/// Configured catalog (selected streams for sync)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfiguredCatalog {
    /// Selected streams
    pub streams: Vec<ConfiguredStream>,
}

impl ConfiguredCatalog {
    /// Select every stream, incremental where supported
    pub fn select_all() -> Self {
        Self {
            streams: registry::STREAMS.iter().map(ConfiguredStream::from_def).collect(),
        }
    }

    /// Select the named streams, incremental where supported
    ///
    /// Unknown names are rejected rather than skipped.
    pub fn select(names: &[String]) -> Result<Self> {
        let streams = names
            .iter()
            .map(|name| registry::get(name).map(ConfiguredStream::from_def))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { streams })
    }
}

/// Configured stream for sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfiguredStream {
    /// Stream reference
    pub stream: CatalogStream,

    /// Selected sync mode
    #[serde(default)]
    pub sync_mode: SyncMode,

    /// Cursor field to use
    #[serde(default)]
    pub cursor_field: Option<Vec<String>>,

    /// Primary key to use
    #[serde(default)]
    pub primary_key: Option<Vec<Vec<String>>>,
}

impl ConfiguredStream {
    /// Configure a stream definition at its richest supported mode
    pub fn from_def(def: &StreamDef) -> Self {
        let sync_mode = if def.is_incremental() {
            SyncMode::Incremental
        } else {
            SyncMode::FullRefresh
        };
        Self {
            stream: CatalogStream::from_def(def),
            sync_mode,
            cursor_field: def.cursor_field().map(|field| vec![field.to_string()]),
            primary_key: Some(vec![vec![def.primary_key.to_string()]]),
        }
    }
}
