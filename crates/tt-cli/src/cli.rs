//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tt_core::LogLevel;

/// Time tracker client for Toggl.
///
/// Logs on with your API token and lists the time entries you tracked.
#[derive(Debug, Parser)]
#[command(name = "tt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Echo client log messages at or above this level to stderr.
    #[arg(long, global = true, value_name = "LEVEL")]
    pub echo_log: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check that the configured API token can open a session.
    Check,

    /// List time entries within a date range.
    Entries {
        /// Start of the range (ISO 8601, YYYY-MM-DD, or e.g. "2 days ago").
        #[arg(long)]
        start: Option<String>,

        /// End of the range (defaults to now).
        #[arg(long)]
        end: Option<String>,

        /// Output entries as JSON lines.
        #[arg(long)]
        json: bool,
    },
}
