use super::fs_state::{FsState, LoadSummary};
use crate::FORMAT_VERSION;
use crate::target::TargetCatalog;
use crate::utils::serialization::{read_int, write_int};
use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Result of reading a state file into an [`FsState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No state file exists yet
    Missing,
    /// State restored from the file
    Loaded(LoadSummary),
    /// File was written by another format version and was ignored
    VersionMismatch {
        /// Version found in the file header
        found: i32,
    },
    /// File could not be decoded; the state was reset
    Discarded,
}

/// On-disk location of a persisted [`FsState`].
///
/// The file starts with [`FORMAT_VERSION`] followed by the state stream.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// Create a handle for the state file at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the state file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the state file exists
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write `state` to disk, replacing the previous file atomically
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create the parent directory or temporary file
    /// - Serialization or writing fails
    /// - Cannot move the temporary file into place
    pub fn save(&self, state: &FsState) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            write_int(&mut writer, FORMAT_VERSION)?;
            state.save(&mut writer).context("Failed to serialize file state")?;
            writer.flush().context("Failed to flush file state")?;
        }
        tmp.as_file()
            .sync_all()
            .context("Failed to sync file state")?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))?;

        info!(path = %self.path.display(), "Saved file state");
        Ok(())
    }

    /// Read the state file into `state`
    ///
    /// On a version mismatch the state is cleared and nothing is loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is malformed
    pub fn load(&self, state: &FsState, catalog: &dyn TargetCatalog) -> Result<LoadOutcome> {
        if !self.path.exists() {
            return Ok(LoadOutcome::Missing);
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open state file: {}", self.path.display()))?;
        let mut reader = BufReader::new(file);

        let found = read_int(&mut reader).context("Failed to read format version")?;
        if found != FORMAT_VERSION {
            warn!(
                path = %self.path.display(),
                found,
                expected = FORMAT_VERSION,
                "Ignoring state file of another format version"
            );
            state.clear_all();
            return Ok(LoadOutcome::VersionMismatch { found });
        }

        let summary = state
            .load(&mut reader, catalog)
            .with_context(|| format!("Failed to load state file: {}", self.path.display()))?;

        let mut trailing = [0u8; 1];
        if reader.read(&mut trailing)? != 0 {
            bail!("Trailing data after file state in {}", self.path.display());
        }

        info!(
            path = %self.path.display(),
            loaded = summary.loaded_targets,
            skipped = summary.skipped_targets,
            "Loaded file state"
        );
        Ok(LoadOutcome::Loaded(summary))
    }

    /// Read the state file, falling back to an empty state on any failure.
    ///
    /// A corrupt file cannot be partially trusted, so every target is left
    /// unscanned and will be rescanned.
    pub fn load_or_reset(&self, state: &FsState, catalog: &dyn TargetCatalog) -> LoadOutcome {
        match self.load(state, catalog) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %format!("{e:#}"),
                    "Discarding unreadable file state"
                );
                state.clear_all();
                LoadOutcome::Discarded
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{BuildRoot, BuildTarget, PermissiveCatalog};
    use tempfile::tempdir;

    fn populated_state() -> FsState {
        let state = FsState::new();
        let target = BuildTarget::new("java-production", "core");
        let root = BuildRoot::new(target.clone(), "src");
        state.mark_dirty(Path::new("/p/src/A.java"), &root, None, false);
        state.register_deleted(&target, Path::new("/p/src/Old.java"), None);
        state.mark_initial_scan_performed(&target);
        state
    }

    #[test]
    fn test_missing_file() -> Result<()> {
        let dir = tempdir()?;
        let file = StateFile::new(dir.path().join("fs_state.bin"));
        assert!(!file.exists());
        assert_eq!(file.load(&FsState::new(), &PermissiveCatalog)?, LoadOutcome::Missing);
        Ok(())
    }

    #[test]
    fn test_save_load() -> Result<()> {
        let dir = tempdir()?;
        let file = StateFile::new(dir.path().join("nested/fs_state.bin"));
        file.save(&populated_state())?;

        let restored = FsState::new();
        let outcome = file.load(&restored, &PermissiveCatalog)?;
        assert!(matches!(outcome, LoadOutcome::Loaded(s) if s.loaded_targets == 1));

        let target = BuildTarget::new("java-production", "core");
        assert!(restored.is_initial_scan_performed(&target));
        assert_eq!(restored.get_deleted_paths(&target).len(), 1);
        Ok(())
    }

    #[test]
    fn test_version_mismatch_clears_state() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("fs_state.bin");
        let mut bytes = Vec::new();
        write_int(&mut bytes, FORMAT_VERSION + 1)?;
        write_int(&mut bytes, 0)?;
        std::fs::write(&path, bytes)?;

        let state = populated_state();
        let outcome = StateFile::new(&path).load(&state, &PermissiveCatalog)?;
        assert_eq!(
            outcome,
            LoadOutcome::VersionMismatch {
                found: FORMAT_VERSION + 1
            }
        );
        assert!(state.scanned_targets().is_empty());
        Ok(())
    }

    #[test]
    fn test_trailing_data_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("fs_state.bin");
        let file = StateFile::new(&path);
        file.save(&populated_state())?;

        let mut bytes = std::fs::read(&path)?;
        bytes.push(0);
        std::fs::write(&path, bytes)?;

        assert!(file.load(&FsState::new(), &PermissiveCatalog).is_err());
        Ok(())
    }

    #[test]
    fn test_load_or_reset_on_corruption() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("fs_state.bin");
        let mut bytes = Vec::new();
        write_int(&mut bytes, FORMAT_VERSION)?;
        bytes.extend_from_slice(b"garbage that is not a valid state stream");
        std::fs::write(&path, bytes)?;

        let state = populated_state();
        let outcome = StateFile::new(&path).load_or_reset(&state, &PermissiveCatalog);

        assert_eq!(outcome, LoadOutcome::Discarded);
        assert!(state.scanned_targets().is_empty());
        Ok(())
    }
}
