//! Argument parsing
//!
//! One binary, four subcommands, matching the protocol operations:
//! `spec`, `check`, `discover`, and `read`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pivotal Tracker source connector CLI
#[derive(Parser, Debug)]
#[command(name = "tracker-source")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the connector config file (JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the sync state file (JSON)
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Sync state passed inline as JSON
    #[arg(long, global = true)]
    pub state_json: Option<String>,

    /// Output format for protocol messages
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the connector specification
    Spec,

    /// Verify the config can reach the Tracker API
    Check {
        /// Config passed inline as JSON
        #[arg(long)]
        config_json: Option<String>,
    },

    /// Print the catalog of available streams
    Discover {
        /// Config passed inline as JSON
        #[arg(long)]
        config_json: Option<String>,
    },

    /// Sync records from the configured streams
    Read {
        /// Comma-separated stream names (defaults to every stream)
        #[arg(long)]
        streams: Option<String>,

        /// Config passed inline as JSON
        #[arg(long)]
        config_json: Option<String>,

        /// Stop each stream after this many records
        #[arg(long)]
        max_records: Option<usize>,
    },
}

/// How protocol messages are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One compact JSON message per line
    Json,
    /// Indented JSON for reading by hand
    Pretty,
}
