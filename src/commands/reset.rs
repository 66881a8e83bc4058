use crate::FsStateContext;
use crate::output;
use crate::storage::FsState;
use anyhow::{Result, bail};

/// Overwrite the state file with an empty state
///
/// Every target becomes unscanned, so the next build rescans everything.
///
/// # Errors
///
/// Returns an error if:
/// - No state file exists and `force` is not set
/// - The empty state cannot be written
pub fn execute(ctx: &FsStateContext, force: bool) -> Result<()> {
    let file = ctx.state_file();
    if !file.exists() && !force {
        bail!(
            "No state file at {} (use --force to create an empty one)",
            file.path().display()
        );
    }

    file.save(&FsState::new())?;
    output::success(&format!("Reset file state at {}", file.path().display()));
    Ok(())
}
