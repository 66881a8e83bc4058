//! File timestamp storage consulted by change detection.
//!
//! The state store never reads these stamps. It only invalidates the entry of
//! a file that became dirty or deleted, so a stale "unchanged" answer cannot
//! be served for it afterwards.

use crate::target::BuildTarget;
use dashmap::DashMap;
use std::path::{Path, PathBuf};

/// External per-target cache of file timestamps
pub trait TimestampCache: Send + Sync {
    /// Drop whatever is known about `file` in `target`
    fn invalidate(&self, file: &Path, target: &BuildTarget);
}

/// In-memory timestamp store keyed by file and target.
#[derive(Debug, Default)]
pub struct Timestamps {
    stamps: DashMap<(PathBuf, BuildTarget), i64>,
}

impl Timestamps {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the modification time of `file` as last processed for `target`
    pub fn set_stamp(&self, file: &Path, target: &BuildTarget, mtime: i64) {
        self.stamps.insert((file.to_path_buf(), target.clone()), mtime);
    }

    /// Stored modification time, if any
    #[must_use]
    pub fn get_stamp(&self, file: &Path, target: &BuildTarget) -> Option<i64> {
        self.stamps
            .get(&(file.to_path_buf(), target.clone()))
            .map(|stamp| *stamp)
    }

    /// Whether `current_mtime` matches the stored stamp
    #[must_use]
    pub fn is_up_to_date(&self, file: &Path, target: &BuildTarget, current_mtime: i64) -> bool {
        self.get_stamp(file, target) == Some(current_mtime)
    }

    /// Number of stored stamps
    #[must_use]
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Drop every stamp
    pub fn clear(&self) {
        self.stamps.clear();
    }
}

impl TimestampCache for Timestamps {
    fn invalidate(&self, file: &Path, target: &BuildTarget) {
        self.stamps.remove(&(file.to_path_buf(), target.clone()));
    }
}
