//! Dirty/deleted file tracking and its persisted form.
//!
//! - [`delta`]: per-target dirty and deleted sets
//! - [`fs_state`]: the state store serving all targets of a build session
//! - [`stamps`]: last dirty-registration time per file
//! - [`timestamps`]: external timestamp cache invalidated on every change
//! - [`state_file`]: versioned on-disk snapshot of the state store

mod codec;
pub mod delta;
pub mod fs_state;
pub mod stamps;
/// Versioned on-disk snapshot with atomic replacement
pub mod state_file;
pub mod timestamps;

use crate::target::BuildRoot;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

pub use delta::FilesDelta;
pub use fs_state::{FsState, LoadSummary};
pub use stamps::{Clock, ManualClock, RegistrationStamps, SystemClock};
pub use state_file::{LoadOutcome, StateFile};
pub use timestamps::{TimestampCache, Timestamps};

/// Dirty files of one target, grouped by the root they belong to
pub type SourcesToRecompile = HashMap<BuildRoot, HashSet<PathBuf>>;
