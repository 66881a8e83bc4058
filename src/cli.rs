//! Command-line interface definitions for `fsstate`.
//!
//! The CLI definitions are shared between the main binary and build tools
//! (like xtask) for man page generation.

#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for fsstate.
#[derive(Parser)]
#[command(
    name = "fsstate",
    version = crate::VERSION,
    about = "Inspect and reset persisted incremental-build file state",
    long_about = "Reads the versioned file-state snapshot written between build sessions \
                  and reports which files are dirty or deleted per build target"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// State file to operate on (overrides the configured location)
    #[arg(long, global = true, env = "FSSTATE_STATE_FILE")]
    pub state: Option<PathBuf>,

    /// Configuration file
    #[arg(long, global = true, env = "FSSTATE_CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// List scanned targets with their dirty and deleted files
    Dump {
        /// Only show targets of this type
        #[arg(long = "type")]
        type_id: Option<String>,

        /// Only show counts, not individual files
        #[arg(short, long)]
        short: bool,
    },

    /// Summarize the state file
    Stats,

    /// Replace the state file with an empty state, forcing a full rescan
    Reset {
        /// Do not fail when no state file exists
        #[arg(short, long)]
        force: bool,
    },

    /// Get and set configuration options
    Config {
        /// Configuration key (e.g., state.dir)
        key: Option<String>,

        /// Value to set
        value: Option<String>,

        /// List all configuration values
        #[arg(short, long)]
        list: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
