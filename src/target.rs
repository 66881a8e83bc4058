//! Build target and source root identities, and the catalog used to resolve them.
//!
//! Targets are opaque to this crate: a `(type_id, id)` pair created by whoever
//! knows about target types. Roots are source scopes nested in exactly one target.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// Identity of an independent unit of incremental build output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildTarget {
    /// Identifier of the target type (e.g. `java-production`)
    type_id: String,
    /// Identifier of the target within its type
    id: String,
}

impl BuildTarget {
    /// Create a target identity
    #[must_use]
    pub fn new(type_id: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            id: id.into(),
        }
    }

    /// Returns the target type identifier
    #[must_use]
    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    /// Returns the target identifier within its type
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_id, self.id)
    }
}

/// A source root scope belonging to exactly one [`BuildTarget`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildRoot {
    /// Owning target
    target: BuildTarget,
    /// Root identifier, unique within the owning target
    root_id: String,
}

impl BuildRoot {
    /// Create a root descriptor
    #[must_use]
    pub fn new(target: BuildTarget, root_id: impl Into<String>) -> Self {
        Self {
            target,
            root_id: root_id.into(),
        }
    }

    /// Returns the owning target
    #[must_use]
    pub const fn target(&self) -> &BuildTarget {
        &self.target
    }

    /// Returns the root identifier
    #[must_use]
    pub fn root_id(&self) -> &str {
        &self.root_id
    }
}

impl fmt::Display for BuildRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.target, self.root_id)
    }
}

/// Resolves persisted identifiers back into live targets and roots.
///
/// Returning `None` means the identifier is no longer known (for example the
/// target type was removed); the loader then skips the record instead of failing.
pub trait TargetCatalog {
    /// Resolve a target by type and target id
    fn resolve_target(&self, type_id: &str, target_id: &str) -> Option<BuildTarget>;

    /// Resolve a root of an already resolved target
    fn resolve_root(&self, target: &BuildTarget, root_id: &str) -> Option<BuildRoot> {
        Some(BuildRoot::new(target.clone(), root_id))
    }
}

/// Catalog that accepts every identifier, used by inspection tooling.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveCatalog;

impl TargetCatalog for PermissiveCatalog {
    fn resolve_target(&self, type_id: &str, target_id: &str) -> Option<BuildTarget> {
        Some(BuildTarget::new(type_id, target_id))
    }
}

/// Registered targets of one type
#[derive(Debug, Default)]
struct TypeEntry {
    /// Accept any target id of this type
    open: bool,
    /// Explicitly registered target ids
    targets: HashSet<String>,
}

/// In-memory registry of target types, targets and their roots.
///
/// A type registered with [`TargetRegistry::register_type`] accepts any target
/// id; otherwise only targets added with [`TargetRegistry::register_target`]
/// resolve. Roots are only checked for targets that had roots registered.
#[derive(Debug, Default)]
pub struct TargetRegistry {
    types: HashMap<String, TypeEntry>,
    roots: HashMap<BuildTarget, HashSet<String>>,
}

impl TargetRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type whose every target id resolves
    pub fn register_type(&mut self, type_id: impl Into<String>) -> &mut Self {
        self.types.entry(type_id.into()).or_default().open = true;
        self
    }

    /// Register a single target
    pub fn register_target(&mut self, target: &BuildTarget) -> &mut Self {
        self.types
            .entry(target.type_id().to_string())
            .or_default()
            .targets
            .insert(target.id().to_string());
        self
    }

    /// Register a root; its target is registered as well
    pub fn register_root(&mut self, root: &BuildRoot) -> &mut Self {
        self.register_target(root.target());
        self.roots
            .entry(root.target().clone())
            .or_default()
            .insert(root.root_id().to_string());
        self
    }

    /// Remove a type and everything registered under it
    pub fn unregister_type(&mut self, type_id: &str) -> &mut Self {
        self.types.remove(type_id);
        self.roots.retain(|target, _| target.type_id() != type_id);
        self
    }

    /// Check whether a type id is known
    #[must_use]
    pub fn has_type(&self, type_id: &str) -> bool {
        self.types.contains_key(type_id)
    }
}

impl TargetCatalog for TargetRegistry {
    fn resolve_target(&self, type_id: &str, target_id: &str) -> Option<BuildTarget> {
        let entry = self.types.get(type_id)?;
        (entry.open || entry.targets.contains(target_id))
            .then(|| BuildTarget::new(type_id, target_id))
    }

    fn resolve_root(&self, target: &BuildTarget, root_id: &str) -> Option<BuildRoot> {
        match self.roots.get(target) {
            Some(known) if !known.contains(root_id) => None,
            _ => Some(BuildRoot::new(target.clone(), root_id)),
        }
    }
}
