#![allow(dead_code)]

use fsstate::{BuildRoot, BuildTarget, TargetRegistry, TimestampCache};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub fn target(type_id: &str, id: &str) -> BuildTarget {
    BuildTarget::new(type_id, id)
}

pub fn root(target: &BuildTarget, id: &str) -> BuildRoot {
    BuildRoot::new(target.clone(), id)
}

/// Registry resolving exactly the given targets
pub fn registry_for(targets: &[&BuildTarget]) -> TargetRegistry {
    let mut registry = TargetRegistry::new();
    for target in targets {
        registry.register_target(target);
    }
    registry
}

/// Timestamp cache recording every invalidation
#[derive(Debug, Default)]
pub struct RecordingCache {
    calls: Mutex<Vec<(PathBuf, BuildTarget)>>,
}

impl RecordingCache {
    pub fn calls(&self) -> Vec<(PathBuf, BuildTarget)> {
        self.calls.lock().unwrap().clone()
    }
}

impl TimestampCache for RecordingCache {
    fn invalidate(&self, file: &Path, target: &BuildTarget) {
        self.calls
            .lock()
            .unwrap()
            .push((file.to_path_buf(), target.clone()));
    }
}
