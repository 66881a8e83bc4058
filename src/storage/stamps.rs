use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of wall-clock time for event stamps
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a clock stopped at `millis`
    #[must_use]
    pub const fn new(millis: i64) -> Self {
        Self {
            now: AtomicI64::new(millis),
        }
    }

    /// Set the current time
    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    /// Move the clock forward
    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Last dirty-registration time per file.
///
/// Shared by all targets. External change detection reads it to tell a
/// build-triggered modification apart from one that happened concurrently.
pub struct RegistrationStamps {
    stamps: DashMap<PathBuf, i64>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RegistrationStamps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationStamps")
            .field("len", &self.stamps.len())
            .finish_non_exhaustive()
    }
}

impl Default for RegistrationStamps {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl RegistrationStamps {
    /// Create an empty ledger driven by `clock`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            stamps: DashMap::new(),
            clock,
        }
    }

    /// Record the current time for `file`, returning the stamp
    pub fn record(&self, file: &Path) -> i64 {
        let now = self.clock.now_millis();
        self.stamps.insert(file.to_path_buf(), now);
        now
    }

    /// Last recorded stamp for `file`
    #[must_use]
    pub fn get(&self, file: &Path) -> Option<i64> {
        self.stamps.get(file).map(|stamp| *stamp)
    }

    /// Number of files with a stamp
    #[must_use]
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    /// Check if no stamp was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Drop every stamp
    pub fn clear(&self) {
        self.stamps.clear();
    }
}
