#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

//! # fsstate - Incremental-Build File-State Tracker
//!
//! Tracks, across repeated build invocations, which source files must be
//! recompiled and which were deleted, per build target. The state survives
//! process restarts through a compact, versioned binary snapshot and is safe
//! to mutate from filesystem watchers and builder threads at the same time.
//!
//! ## Architecture
//!
//! - [`target`]: opaque target/root identities and the catalog resolving them on load
//! - [`storage`]: per-target deltas, the [`FsState`] store, event stamps and persistence
//! - [`config`]: configuration file for the `fsstate` CLI
//! - [`commands`]: CLI command implementations
//! - [`utils`]: binary primitives and path helpers
//!
//! ## Example Usage
//!
//! ```
//! use fsstate::{BuildRoot, BuildTarget, FsState, PermissiveCatalog};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let state = FsState::new();
//! let target = BuildTarget::new("java-production", "core");
//! let root = BuildRoot::new(target.clone(), "src");
//!
//! assert!(state.has_work_to_do(&target));
//! state.mark_initial_scan_performed(&target);
//! state.mark_dirty(Path::new("/project/src/Main.java"), &root, None, true);
//!
//! let mut bytes = Vec::new();
//! state.save(&mut bytes)?;
//!
//! let restored = FsState::new();
//! restored.load(&mut bytes.as_slice(), &PermissiveCatalog)?;
//! assert_eq!(restored.get_sources_to_recompile(&target)[&root].len(), 1);
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// CLI command implementations.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Log subscriber setup for the binary.
pub mod logging;

/// Output formatting and verbosity control.
pub mod output;

/// Dirty/deleted tracking, the state store and its persistence.
pub mod storage;

/// Build target and root identities.
pub mod target;

/// Utility functions and helpers.
pub mod utils;

pub use storage::{
    Clock, FilesDelta, FsState, LoadOutcome, LoadSummary, ManualClock, RegistrationStamps,
    SourcesToRecompile, StateFile, SystemClock, TimestampCache, Timestamps,
};
pub use target::{BuildRoot, BuildTarget, PermissiveCatalog, TargetCatalog, TargetRegistry};

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Current version of the fsstate binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version integer written at the start of every state file.
pub const FORMAT_VERSION: i32 = 3;

/// Default name of the state file.
pub const STATE_FILE: &str = "fs_state.bin";

/// Default configuration file path relative to the user config directory.
pub const DEFAULT_CONFIG_PATH: &str = "fsstate/config.toml";

/// Context shared by all CLI commands.
///
/// Holds the loaded configuration and the resolved state file location.
#[derive(Debug, Clone)]
pub struct FsStateContext {
    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,

    /// Path to the state file commands operate on.
    pub state_path: PathBuf,
}

impl FsStateContext {
    /// Creates a context from the default configuration location.
    ///
    /// `config_path` and `state_path` override the defaults when given.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined or if the
    /// configuration file cannot be read, created or validated.
    pub fn new(config_path: Option<PathBuf>, state_path: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path,
            None => dirs::config_dir()
                .context("Could not find config directory")?
                .join(DEFAULT_CONFIG_PATH),
        };

        let mut context = Self::new_explicit(config_path, None)?;
        if let Some(path) = state_path {
            context.state_path = path;
        }

        match config::validator::unknown_fields(&context.config_path) {
            Ok(fields) => {
                for field in fields {
                    output::warning(&format!("Unknown configuration field: {field}"));
                }
            }
            Err(e) => output::warning(&format!("Configuration validation failed: {e}")),
        }

        Ok(context)
    }

    /// Creates a context with explicit paths.
    ///
    /// Without `state_path`, the state file location comes from the configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded, created or validated.
    pub fn new_explicit(config_path: PathBuf, state_path: Option<PathBuf>) -> Result<Self> {
        let config = config::Config::load(&config_path)?;
        config::validator::validate_config(&config)
            .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

        let state_path = match state_path {
            Some(path) => path,
            None => config.state_file_path()?,
        };

        Ok(Self {
            config_path,
            config,
            state_path,
        })
    }

    /// Handle to the state file.
    #[must_use]
    pub fn state_file(&self) -> StateFile {
        StateFile::new(&self.state_path)
    }

    /// Reads the state file for inspection, accepting every persisted target.
    ///
    /// # Errors
    /// Returns an error if the state file is unreadable and
    /// `state.reset_on_corruption` is disabled.
    pub fn load_state(&self) -> Result<(FsState, LoadOutcome)> {
        let state = FsState::new();
        let file = self.state_file();
        let outcome = if self.config.state.reset_on_corruption {
            file.load_or_reset(&state, &PermissiveCatalog)
        } else {
            file.load(&state, &PermissiveCatalog)?
        };
        Ok((state, outcome))
    }
}
