//! Utility functions and helpers.
//!
//! - [`serialization`]: fixed-width binary primitives of the state stream
//! - [`expand_tilde`]: home directory expansion for configured paths

/// Binary serialization primitives
pub mod serialization;

use anyhow::Result;
use std::path::PathBuf;

/// Expands a path starting with `~` to the user's home directory.
///
/// # Errors
///
/// Returns an error if the path is empty.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    if path.is_empty() {
        anyhow::bail!("Path cannot be empty");
    }
    if path.starts_with("~/")
        && let Some(home) = dirs::home_dir()
    {
        return Ok(home.join(&path[2..]));
    }
    Ok(PathBuf::from(path))
}
