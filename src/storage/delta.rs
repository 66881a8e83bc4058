use super::SourcesToRecompile;
use crate::target::BuildRoot;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Dirty and deleted file sets of a single target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DeltaSets {
    /// Files to recompile, grouped by the root they belong to
    pub(crate) dirty: SourcesToRecompile,
    /// Files removed since the last build
    pub(crate) deleted: HashSet<PathBuf>,
}

impl DeltaSets {
    /// Whether there is anything left to process
    fn has_changes(&self) -> bool {
        !self.deleted.is_empty() || self.dirty.values().any(|files| !files.is_empty())
    }
}

/// Per-target dirty/deleted tracking.
///
/// Each delta carries its own lock, so threads working on different targets
/// never contend with each other.
#[derive(Debug, Default)]
pub struct FilesDelta {
    sets: Mutex<DeltaSets>,
}

impl FilesDelta {
    /// Create an empty delta
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a delta from decoded sets
    pub(crate) fn from_sets(sets: DeltaSets) -> Self {
        Self {
            sets: Mutex::new(sets),
        }
    }

    /// Lock the sets; a panic in another holder cannot leave them half-updated
    fn lock(&self) -> MutexGuard<'_, DeltaSets> {
        self.sets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark a file under `root` for recompilation.
    ///
    /// Returns `true` if the file was not already dirty. Files recorded as
    /// deleted are marked as well.
    pub fn mark_recompile(&self, root: &BuildRoot, file: &Path) -> bool {
        let mut sets = self.lock();
        insert_dirty(&mut sets.dirty, root, file)
    }

    /// Mark a file for recompilation unless it is recorded as deleted.
    ///
    /// Returns `false` without touching any state when the file is deleted.
    pub fn mark_recompile_if_not_deleted(&self, root: &BuildRoot, file: &Path) -> bool {
        let mut sets = self.lock();
        if sets.deleted.contains(file) {
            return false;
        }
        insert_dirty(&mut sets.dirty, root, file)
    }

    /// Forget every dirty file of `root`
    pub fn clear_recompile(&self, root: &BuildRoot) {
        self.lock().dirty.remove(root);
    }

    /// Record a deleted file
    pub fn add_deleted(&self, file: &Path) {
        self.lock().deleted.insert(file.to_path_buf());
    }

    /// Forget every deleted file
    pub fn clear_deleted_paths(&self) {
        self.lock().deleted.clear();
    }

    /// Take the deleted files, leaving the set empty.
    ///
    /// The snapshot and the clear happen under one lock, so a deletion
    /// registered concurrently is either returned here or kept for later.
    #[must_use]
    pub fn get_and_clear_deleted_paths(&self) -> HashSet<PathBuf> {
        std::mem::take(&mut self.lock().deleted)
    }

    /// Copy of the deleted files without clearing them
    #[must_use]
    pub fn deleted_paths(&self) -> HashSet<PathBuf> {
        self.lock().deleted.clone()
    }

    /// Copy of the dirty files per root
    #[must_use]
    pub fn get_sources_to_recompile(&self) -> SourcesToRecompile {
        self.lock().dirty.clone()
    }

    /// Whether any root has dirty files or any file was deleted
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.lock().has_changes()
    }

    /// Consistent copy of both sets, used when saving
    pub(crate) fn snapshot(&self) -> DeltaSets {
        self.lock().clone()
    }
}

fn insert_dirty(
    dirty: &mut HashMap<BuildRoot, HashSet<PathBuf>>,
    root: &BuildRoot,
    file: &Path,
) -> bool {
    if let Some(files) = dirty.get_mut(root) {
        return files.insert(file.to_path_buf());
    }
    dirty.insert(root.clone(), HashSet::from([file.to_path_buf()]));
    true
}
