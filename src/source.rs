//! Source trait and the Tracker implementation
//!
//! Defines the host-facing surface of the connector: `spec` describes
//! the configuration, `check` verifies credentials, `discover` lists
//! streams, and `read` produces the message stream a host consumes.

use crate::config::{connection_spec, SourceConfig, SpecConfig};
use crate::discovery::ProjectDiscovery;
use crate::engine::{SyncConfig, SyncEngine};
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig};
use crate::state::{State, StateManager};
use crate::streams::{self, Catalog, ConfiguredCatalog};
use crate::types::LogLevel;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::pin::Pin;

use crate::auth::TokenAuthenticator;

/// API reference served alongside the spec
pub const DOCUMENTATION_URL: &str = "https://www.pivotaltracker.com/help/api/rest/v5";

// ============================================================================
// Connector Spec (for UI)
// ============================================================================

/// Connector specification returned by spec()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorSpec {
    /// Connector name
    pub name: String,

    /// Human-readable title
    pub title: String,

    /// Description
    pub description: Option<String>,

    /// Configuration specification
    pub spec: SpecConfig,

    /// Icon URL
    pub icon: Option<String>,
}

// ============================================================================
// Check Result
// ============================================================================

/// Result of a connection check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the check succeeded
    pub success: bool,

    /// Error message if failed
    pub message: Option<String>,
}

impl CheckResult {
    /// Create a successful check result
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Create a failed check result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Messages emitted during read operations
#[derive(Debug, Clone)]
pub enum Message {
    /// A single record
    Record {
        /// Stream name
        stream: String,
        /// Record data
        data: Value,
        /// Timestamp when the record was emitted
        emitted_at: DateTime<Utc>,
    },

    /// State checkpoint for one stream
    State {
        /// Stream name
        stream: String,
        /// Cursor state data
        data: Value,
    },

    /// Log message
    Log {
        /// Log level
        level: LogLevel,
        /// Log message
        message: String,
    },
}

impl Message {
    /// Create a record message
    pub fn record(stream: impl Into<String>, data: Value) -> Self {
        Self::Record {
            stream: stream.into(),
            data,
            emitted_at: Utc::now(),
        }
    }

    /// Create a state message
    pub fn state(stream: impl Into<String>, data: Value) -> Self {
        Self::State {
            stream: stream.into(),
            data,
        }
    }

    /// Create a log message
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Self::Log {
            level,
            message: message.into(),
        }
    }

    /// Create a debug log message
    pub fn debug(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Debug, message)
    }

    /// Create an info log message
    pub fn info(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Info, message)
    }

    /// Create a warning log message
    pub fn warn(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Warn, message)
    }

    /// Create an error log message
    pub fn error(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Error, message)
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a state message
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }

    /// Check if this is a log message
    pub fn is_log(&self) -> bool {
        matches!(self, Self::Log { .. })
    }

    /// Render the message as its wire envelope
    pub fn to_json(&self) -> Value {
        match self {
            Self::Record {
                stream,
                data,
                emitted_at,
            } => json!({
                "type": "RECORD",
                "record": {
                    "stream": stream,
                    "data": data,
                    "emitted_at": emitted_at.timestamp_millis(),
                }
            }),
            Self::State { stream, data } => json!({
                "type": "STATE",
                "state": {
                    "type": "STREAM",
                    "stream": {
                        "stream_descriptor": { "name": stream },
                        "stream_state": data,
                    }
                }
            }),
            Self::Log { level, message } => json!({
                "type": "LOG",
                "log": {
                    "level": level,
                    "message": message,
                }
            }),
        }
    }
}

// ============================================================================
// Source Trait
// ============================================================================

/// Type alias for the message stream returned by read()
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<Message>> + Send>>;

/// Core trait a source connector implements
#[async_trait]
pub trait Source: Send + Sync {
    /// Returns the connector specification (for UI/validation)
    fn spec(&self) -> ConnectorSpec;

    /// Tests if credentials and configuration are valid
    async fn check(&self, config: &SourceConfig) -> Result<CheckResult>;

    /// Lists available streams from the source
    async fn discover(&self, config: &SourceConfig) -> Result<Catalog>;

    /// Reads data from selected streams
    ///
    /// Returns a stream of messages (records, state checkpoints, logs)
    async fn read(
        &self,
        config: &SourceConfig,
        catalog: &ConfiguredCatalog,
        state: Option<&State>,
    ) -> Result<MessageStream>;
}

// ============================================================================
// Tracker Source
// ============================================================================

/// The Pivotal Tracker source connector
#[derive(Debug, Clone, Default)]
pub struct TrackerSource {
    sync_config: SyncConfig,
}

impl TrackerSource {
    /// Create a new source with default sync configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sync configuration used by read()
    #[must_use]
    pub fn with_sync_config(mut self, sync_config: SyncConfig) -> Self {
        self.sync_config = sync_config;
        self
    }

    /// Build an authenticated client for the configured API
    fn http_client(config: &SourceConfig) -> HttpClient {
        let http_config = HttpClientConfig::builder()
            .base_url(&config.base_url)
            .build();
        HttpClient::with_auth(http_config, TokenAuthenticator::new(&config.api_token))
    }
}

#[async_trait]
impl Source for TrackerSource {
    fn spec(&self) -> ConnectorSpec {
        ConnectorSpec {
            name: "pivotal-tracker".to_string(),
            title: "Pivotal Tracker".to_string(),
            description: Some(
                "Reads projects, stories, memberships, labels, releases, epics, and \
                 activity from the Pivotal Tracker REST API"
                    .to_string(),
            ),
            spec: connection_spec(),
            icon: None,
        }
    }

    async fn check(&self, config: &SourceConfig) -> Result<CheckResult> {
        let client = Self::http_client(config);

        // Any number of accessible projects, including zero, passes.
        // Only a failure to list projects at all fails the check.
        match ProjectDiscovery::new(&client).discover().await {
            Ok(_) => Ok(CheckResult::success()),
            Err(err) => Ok(CheckResult::failure(format!(
                "Connection check failed: {err}"
            ))),
        }
    }

    async fn discover(&self, _config: &SourceConfig) -> Result<Catalog> {
        Ok(Catalog::built_in())
    }

    async fn read(
        &self,
        config: &SourceConfig,
        catalog: &ConfiguredCatalog,
        state: Option<&State>,
    ) -> Result<MessageStream> {
        let client = Self::http_client(config);

        let project_ids = ProjectDiscovery::new(&client).discover().await?;

        let manager = match state {
            Some(state) => StateManager::from_state(state.clone()),
            None => StateManager::in_memory(),
        };
        let mut engine = SyncEngine::new(client, manager).with_config(self.sync_config.clone());

        let mut messages = vec![Message::info(format!(
            "Discovered {} accessible projects",
            project_ids.len()
        ))];

        for configured in &catalog.streams {
            let name = &configured.stream.name;
            let def = match streams::get(name) {
                Ok(def) => def,
                Err(err) => {
                    messages.push(Message::error(format!("Error syncing stream {name}: {err}")));
                    continue;
                }
            };

            match engine
                .sync_stream(def, configured.sync_mode, &project_ids)
                .await
            {
                Ok(stream_messages) => messages.extend(stream_messages),
                Err(err) => {
                    messages.push(Message::error(format!("Error syncing stream {name}: {err}")));
                }
            }
        }

        Ok(Box::pin(futures::stream::iter(messages.into_iter().map(Ok))))
    }
}
