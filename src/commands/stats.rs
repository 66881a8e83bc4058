use crate::FsStateContext;
use crate::commands::report_outcome;
use anyhow::Result;
use colored::Colorize;
use std::collections::{BTreeSet, HashSet};

/// Print a summary of the state file
///
/// # Errors
///
/// Returns an error if the state file cannot be read
pub fn execute(ctx: &FsStateContext) -> Result<()> {
    let file = ctx.state_file();
    if !file.exists() {
        println!("{} {}", "No state file at".dimmed(), file.path().display());
        return Ok(());
    }

    let size = std::fs::metadata(file.path())?.len();
    let (state, outcome) = ctx.load_state()?;
    report_outcome(&outcome);

    let targets = state.scanned_targets();
    let types: BTreeSet<&str> = targets.iter().map(|t| t.type_id()).collect();

    let mut dirty = 0;
    let mut deleted = 0;
    let mut pending = 0;
    for target in &targets {
        dirty += state
            .get_sources_to_recompile(target)
            .values()
            .map(HashSet::len)
            .sum::<usize>();
        deleted += state.get_deleted_paths(target).len();
        if state.has_work_to_do(target) {
            pending += 1;
        }
    }

    println!("{}  {}", "file".bold(), file.path().display());
    println!("{}  {size} bytes", "size".bold());
    println!("{} {}", "types".bold(), types.len());
    println!(
        "{} {} ({} with pending work)",
        "targets".bold(),
        targets.len(),
        pending
    );
    println!("{} {dirty}", "dirty files".bold());
    println!("{} {deleted}", "deleted files".bold());

    Ok(())
}
