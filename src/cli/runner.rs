//! Command execution
//!
//! [`Runner`] wires parsed arguments to the source: it loads config
//! and state from the places the flags point at, drives the chosen
//! operation, and prints protocol messages to stdout.

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::SourceConfig;
use crate::engine::SyncConfig;
use crate::error::{Error, Result};
use crate::source::{Message, Source, TrackerSource, DOCUMENTATION_URL};
use crate::state::StateManager;
use crate::streams::ConfiguredCatalog;
use crate::types::LogLevel;
use futures::StreamExt;
use serde_json::{json, Value};
use std::time::Instant;

/// Counters accumulated while draining the read stream
#[derive(Debug, Default)]
struct ReadTally {
    records: usize,
    failed_streams: usize,
}

impl ReadTally {
    fn overall_status(&self, total_streams: usize) -> &'static str {
        if self.failed_streams == 0 {
            "SUCCEEDED"
        } else if self.failed_streams == total_streams {
            "FAILED"
        } else {
            "PARTIAL"
        }
    }
}

/// Executes one parsed CLI invocation
pub struct Runner {
    cli: Cli,
}

impl Runner {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Dispatch to the selected subcommand
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(),
            Commands::Check { config_json } => self.check(config_json.as_deref()).await,
            Commands::Discover { config_json } => self.discover(config_json.as_deref()).await,
            Commands::Read {
                streams,
                config_json,
                max_records,
            } => {
                self.read(streams.as_deref(), config_json.as_deref(), *max_records)
                    .await
            }
        }
    }

    /// Config resolution: inline JSON wins over the config file flag
    fn load_config(&self, inline: Option<&str>) -> Result<SourceConfig> {
        if let Some(json_str) = inline {
            let value: Value = serde_json::from_str(json_str)
                .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
            return SourceConfig::from_value(&value);
        }

        match &self.cli.config {
            Some(path) => SourceConfig::from_file(path),
            None => Err(Error::config(
                "Config not specified (use --config or --config-json)",
            )),
        }
    }

    /// State resolution: inline JSON, then the state file, then empty
    fn load_state(&self) -> Result<StateManager> {
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    fn spec(&self) -> Result<()> {
        let spec = TrackerSource::new().spec();

        self.emit(&json!({
            "type": "SPEC",
            "spec": {
                "documentationUrl": DOCUMENTATION_URL,
                "connectionSpecification": spec.spec.to_json_schema()
            }
        }));

        Ok(())
    }

    async fn check(&self, config_json: Option<&str>) -> Result<()> {
        let config = self.load_config(config_json)?;

        self.emit(&Message::log(
            LogLevel::Info,
            format!("Checking connection to {}", config.base_url),
        )
        .to_json());

        let result = TrackerSource::new().check(&config).await?;
        let (status, message) = if result.success {
            ("SUCCEEDED", "Connection successful".to_string())
        } else {
            (
                "FAILED",
                result
                    .message
                    .unwrap_or_else(|| "Connection failed".to_string()),
            )
        };

        self.emit(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": { "status": status, "message": message }
        }));

        Ok(())
    }

    async fn discover(&self, config_json: Option<&str>) -> Result<()> {
        let config = self.load_config(config_json)?;
        let catalog = TrackerSource::new().discover(&config).await?;

        self.emit(&json!({
            "type": "CATALOG",
            "catalog": catalog
        }));

        Ok(())
    }

    async fn read(
        &self,
        streams: Option<&str>,
        config_json: Option<&str>,
        max_records: Option<usize>,
    ) -> Result<()> {
        let sync_start = Instant::now();
        let config = self.load_config(config_json)?;
        let state = self.load_state()?;
        let catalog = Self::select_catalog(streams)?;

        let mut sync_config = SyncConfig::new();
        if let Some(max) = max_records {
            sync_config = sync_config.with_max_records(max);
        }

        let source = TrackerSource::new().with_sync_config(sync_config);
        let initial_state = state.snapshot().await;
        let mut message_stream = source.read(&config, &catalog, Some(&initial_state)).await?;

        let mut tally = ReadTally::default();
        while let Some(message) = message_stream.next().await {
            let message = message?;

            match &message {
                Message::Record { .. } => tally.records += 1,
                Message::State { stream, data } => {
                    // Mirror every checkpoint into the runner's state so
                    // the file on disk tracks the sync as it progresses.
                    if let Value::Object(stream_state) = data {
                        state.set_stream(stream, stream_state.clone()).await?;
                    }
                }
                Message::Log {
                    level: LogLevel::Error,
                    ..
                } => tally.failed_streams += 1,
                Message::Log { .. } => {}
            }

            self.emit(&message.to_json());
        }

        let state_file = match &self.cli.state {
            Some(path) => {
                state.save_to_file(path).await?;
                Some(path.to_string_lossy().to_string())
            }
            None => None,
        };

        // Final state goes to stdout even without a state file, so a
        // caller capturing output can resume the next sync from it.
        self.emit(&json!({
            "type": "STATE",
            "state": state.snapshot().await
        }));

        self.emit(&self.summary(&tally, &catalog, sync_start, state_file));

        Ok(())
    }

    fn select_catalog(streams: Option<&str>) -> Result<ConfiguredCatalog> {
        match streams {
            Some(list) => {
                let names: Vec<String> = list.split(',').map(|s| s.trim().to_string()).collect();
                ConfiguredCatalog::select(&names)
            }
            None => Ok(ConfiguredCatalog::select_all()),
        }
    }

    fn summary(
        &self,
        tally: &ReadTally,
        catalog: &ConfiguredCatalog,
        sync_start: Instant,
        state_file: Option<String>,
    ) -> Value {
        let total_streams = catalog.streams.len();

        json!({
            "type": "SYNC_SUMMARY",
            "summary": {
                "status": tally.overall_status(total_streams),
                "connector": "pivotal-tracker",
                "total_records": tally.records,
                "total_streams": total_streams,
                "failed_streams": tally.failed_streams,
                "duration_ms": sync_start.elapsed().as_millis() as u64,
                "output": {
                    "format": match self.cli.format {
                        OutputFormat::Json => "json",
                        OutputFormat::Pretty => "pretty",
                    },
                    "state_file": state_file
                }
            }
        })
    }

    fn emit(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
