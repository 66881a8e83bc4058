use super::SourcesToRecompile;
use super::codec::{read_delta, skip_delta, write_delta};
use super::delta::{DeltaSets, FilesDelta};
use super::stamps::{Clock, RegistrationStamps, SystemClock};
use super::timestamps::TimestampCache;
use crate::target::{BuildRoot, BuildTarget, TargetCatalog};
use crate::utils::serialization::{read_count, read_string, write_count, write_string};
use anyhow::{Context, Result};
use dashmap::{DashMap, DashSet};
use std::collections::{BTreeMap, HashSet};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Level, debug, info, span};

/// Outcome of [`FsState::load`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Targets restored and marked as scanned
    pub loaded_targets: usize,
    /// Target records skipped because the catalog did not resolve them
    pub skipped_targets: usize,
    /// Root records skipped inside otherwise loaded targets
    pub skipped_roots: usize,
}

/// File state of every build target for one build session.
///
/// Created once per session, optionally hydrated with [`FsState::load`],
/// flushed with [`FsState::save`] and reset with [`FsState::clear_all`].
#[derive(Debug)]
pub struct FsState {
    /// Lazily created per-target deltas; the map lock only guards lookup/creation
    deltas: DashMap<BuildTarget, Arc<FilesDelta>>,
    /// Targets whose initial full scan has completed
    initial_scan_performed: DashSet<BuildTarget>,
    registration_stamps: RegistrationStamps,
}

impl Default for FsState {
    fn default() -> Self {
        Self::new()
    }
}

impl FsState {
    /// Create an empty state using the system clock for event stamps
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty state with a custom clock for event stamps
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            deltas: DashMap::new(),
            initial_scan_performed: DashSet::new(),
            registration_stamps: RegistrationStamps::new(clock),
        }
    }

    /// Delta of `target`, created on first use.
    ///
    /// The same instance is returned for the lifetime of the state (until
    /// [`FsState::clear_all`] or a load replaces it).
    #[must_use]
    pub fn get_delta(&self, target: &BuildTarget) -> Arc<FilesDelta> {
        if let Some(delta) = self.deltas.get(target) {
            return Arc::clone(delta.value());
        }
        Arc::clone(self.deltas.entry(target.clone()).or_default().value())
    }

    /// Existing delta of `target`; never creates one
    fn existing_delta(&self, target: &BuildTarget) -> Option<Arc<FilesDelta>> {
        self.deltas.get(target).map(|delta| Arc::clone(delta.value()))
    }

    /// Mark `file` under `root` as dirty.
    ///
    /// When the file was not dirty yet, records an event stamp (if
    /// `save_event_stamp`) and invalidates the file in `stamps`. Returns whether
    /// the file was newly marked.
    pub fn mark_dirty(
        &self,
        file: &Path,
        root: &BuildRoot,
        stamps: Option<&dyn TimestampCache>,
        save_event_stamp: bool,
    ) -> bool {
        let marked = self.get_delta(root.target()).mark_recompile(root, file);
        if marked {
            if save_event_stamp {
                self.registration_stamps.record(file);
            }
            if let Some(stamps) = stamps {
                stamps.invalidate(file, root.target());
            }
        }
        marked
    }

    /// Like [`FsState::mark_dirty`], but leaves files recorded as deleted alone
    pub fn mark_dirty_if_not_deleted(
        &self,
        file: &Path,
        root: &BuildRoot,
        stamps: Option<&dyn TimestampCache>,
    ) -> bool {
        let marked = self
            .get_delta(root.target())
            .mark_recompile_if_not_deleted(root, file);
        if marked && let Some(stamps) = stamps {
            stamps.invalidate(file, root.target());
        }
        marked
    }

    /// Record `file` as deleted from `target`
    pub fn register_deleted(
        &self,
        target: &BuildTarget,
        file: &Path,
        stamps: Option<&dyn TimestampCache>,
    ) {
        self.get_delta(target).add_deleted(file);
        if let Some(stamps) = stamps {
            stamps.invalidate(file, target);
        }
    }

    /// Time `file` was last marked dirty with an event stamp, in epoch millis
    #[must_use]
    pub fn get_event_registration_stamp(&self, file: &Path) -> Option<i64> {
        self.registration_stamps.get(file)
    }

    /// Snapshot of the dirty files of `target`, grouped by root
    #[must_use]
    pub fn get_sources_to_recompile(&self, target: &BuildTarget) -> SourcesToRecompile {
        self.existing_delta(target)
            .map(|delta| delta.get_sources_to_recompile())
            .unwrap_or_default()
    }

    /// Forget the dirty files of `root` once it has been reprocessed
    pub fn clear_recompile(&self, root: &BuildRoot) {
        if let Some(delta) = self.existing_delta(root.target()) {
            delta.clear_recompile(root);
        }
    }

    /// Forget the deleted files of `target`
    pub fn clear_deleted_paths(&self, target: &BuildTarget) {
        if let Some(delta) = self.existing_delta(target) {
            delta.clear_deleted_paths();
        }
    }

    /// Take the deleted files of `target`, leaving none behind
    #[must_use]
    pub fn get_and_clear_deleted_paths(&self, target: &BuildTarget) -> HashSet<PathBuf> {
        self.existing_delta(target)
            .map(|delta| delta.get_and_clear_deleted_paths())
            .unwrap_or_default()
    }

    /// Deleted files of `target` without clearing them
    #[must_use]
    pub fn get_deleted_paths(&self, target: &BuildTarget) -> HashSet<PathBuf> {
        self.existing_delta(target)
            .map(|delta| delta.deleted_paths())
            .unwrap_or_default()
    }

    /// Whether `target` must be (re)built.
    ///
    /// A target that never finished its initial scan always has work to do.
    #[must_use]
    pub fn has_work_to_do(&self, target: &BuildTarget) -> bool {
        if !self.initial_scan_performed.contains(target) {
            return true;
        }
        self.existing_delta(target)
            .is_some_and(|delta| delta.has_changes())
    }

    /// Record that the initial full scan of `target` has completed
    pub fn mark_initial_scan_performed(&self, target: &BuildTarget) {
        self.initial_scan_performed.insert(target.clone());
    }

    /// Whether the initial full scan of `target` has completed
    #[must_use]
    pub fn is_initial_scan_performed(&self, target: &BuildTarget) -> bool {
        self.initial_scan_performed.contains(target)
    }

    /// Scanned targets, sorted by type and id
    #[must_use]
    pub fn scanned_targets(&self) -> Vec<BuildTarget> {
        let mut targets: Vec<BuildTarget> = self
            .initial_scan_performed
            .iter()
            .map(|target| target.key().clone())
            .collect();
        targets.sort();
        targets
    }

    /// Drop every delta, scan flag and event stamp
    pub fn clear_all(&self) {
        self.initial_scan_performed.clear();
        self.deltas.clear();
        self.registration_stamps.clear();
    }

    /// Serialize the deltas of all scanned targets.
    ///
    /// Targets that were never scanned are left out; they get a full rescan
    /// on the next session anyway.
    ///
    /// # Errors
    ///
    /// Returns an error if a path is not valid UTF-8 or the writer fails
    pub fn save<W: Write>(&self, out: &mut W) -> Result<()> {
        let span = span!(Level::DEBUG, "fs_state_save");
        let _guard = span.enter();

        let mut by_type: BTreeMap<String, Vec<BuildTarget>> = BTreeMap::new();
        for target in self.scanned_targets() {
            by_type
                .entry(target.type_id().to_string())
                .or_default()
                .push(target);
        }

        write_count(out, by_type.len())?;
        for (type_id, targets) in &by_type {
            write_string(out, type_id)?;
            write_count(out, targets.len())?;
            for target in targets {
                write_string(out, target.id())?;
                let sets = self
                    .existing_delta(target)
                    .map(|delta| delta.snapshot())
                    .unwrap_or_default();
                write_delta(out, &sets)
                    .with_context(|| format!("Failed to write delta of {target}"))?;
            }
        }

        debug!(
            types = by_type.len(),
            targets = self.initial_scan_performed.len(),
            "Saved file state"
        );
        Ok(())
    }

    /// Restore deltas written by [`FsState::save`].
    ///
    /// Each resolved target gets its decoded delta (replacing any existing
    /// one) and is marked as scanned. Records the catalog cannot resolve are
    /// consumed and skipped, so those targets are rescanned.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is truncated or malformed. The state may
    /// then be partially loaded; callers should [`FsState::clear_all`] it.
    pub fn load<R: Read>(&self, input: &mut R, catalog: &dyn TargetCatalog) -> Result<LoadSummary> {
        let span = span!(Level::DEBUG, "fs_state_load");
        let _guard = span.enter();

        let mut summary = LoadSummary::default();

        let type_count = read_count(input).context("Failed to read target type count")?;
        for _ in 0..type_count {
            let type_id = read_string(input).context("Failed to read target type id")?;
            let target_count = read_count(input)
                .with_context(|| format!("Failed to read target count of type {type_id}"))?;

            for _ in 0..target_count {
                let id = read_string(input).context("Failed to read target id")?;
                match catalog.resolve_target(&type_id, &id) {
                    Some(target) => {
                        let decoded = read_delta(input, &target, catalog)
                            .with_context(|| format!("Failed to read delta of {target}"))?;
                        self.install(target, decoded.sets);
                        summary.loaded_targets += 1;
                        summary.skipped_roots += decoded.skipped_roots;
                    }
                    None => {
                        info!(type_id = %type_id, id = %id, "Skipping unknown target");
                        skip_delta(input).with_context(|| {
                            format!("Failed to skip delta of {type_id}:{id}")
                        })?;
                        summary.skipped_targets += 1;
                    }
                }
            }
        }

        debug!(?summary, "Loaded file state");
        Ok(summary)
    }

    /// Replace the delta of `target` and mark it scanned
    fn install(&self, target: BuildTarget, sets: DeltaSets) {
        self.deltas
            .insert(target.clone(), Arc::new(FilesDelta::from_sets(sets)));
        self.initial_scan_performed.insert(target);
    }
}
