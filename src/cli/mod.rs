//! Command-line interface
//!
//! Argument parsing and command execution. Protocol messages go to
//! stdout; logs go to stderr.

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
