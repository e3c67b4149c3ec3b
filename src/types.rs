//! Shared vocabulary types
//!
//! Small enums and aliases used across module boundaries: the sync
//! modes advertised in the catalog, the levels carried by LOG
//! messages, and the property types used in the connector spec.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Aliases
// ============================================================================

/// Arbitrary JSON value
pub type JsonValue = serde_json::Value;

/// JSON object, as used for records and saved cursors
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// String-to-string map, as used for headers and query parameters
pub type StringMap = HashMap<String, String>;

// ============================================================================
// Protocol Vocabulary
// ============================================================================

/// How a stream is read during a sync
///
/// Serialized in snake_case, matching the values a configured
/// catalog uses for `sync_mode` and `supported_sync_modes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Re-read every record on every sync
    #[default]
    FullRefresh,
    /// Read only records changed since the saved cursor
    Incremental,
}

/// Severity carried by LOG messages on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// JSON schema type for a field in the connector spec
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

// ============================================================================
// Transport Vocabulary
// ============================================================================

/// Shape of the delay curve between retry attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Same delay before every attempt
    Constant,
    /// Delay grows by the initial amount each attempt
    Linear,
    /// Delay doubles each attempt
    #[default]
    Exponential,
}

// ============================================================================
// Helpers
// ============================================================================

/// Treats empty strings as absent values
pub trait OptionStringExt {
    /// `None` when the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
