use crate::FsStateContext;
use crate::commands::report_outcome;
use anyhow::Result;
use colored::Colorize;
use std::collections::HashSet;

/// Print every scanned target with its dirty and deleted files
///
/// # Errors
///
/// Returns an error if the state file cannot be read
pub fn execute(ctx: &FsStateContext, type_id: Option<&str>, short: bool) -> Result<()> {
    let (state, outcome) = ctx.load_state()?;
    report_outcome(&outcome);

    let targets: Vec<_> = state
        .scanned_targets()
        .into_iter()
        .filter(|target| type_id.is_none_or(|t| target.type_id() == t))
        .collect();

    if targets.is_empty() {
        println!("{}", "No scanned targets".dimmed());
        return Ok(());
    }

    for target in targets {
        let sources = state.get_sources_to_recompile(&target);
        let mut deleted: Vec<_> = state.get_deleted_paths(&target).into_iter().collect();
        deleted.sort();
        let dirty_count: usize = sources.values().map(HashSet::len).sum();

        if state.has_work_to_do(&target) {
            println!(
                "{} {}",
                target.to_string().yellow().bold(),
                format!("({dirty_count} dirty, {} deleted)", deleted.len()).dimmed()
            );
        } else {
            println!("{} {}", target.to_string().bold(), "up to date".green());
        }

        if short {
            continue;
        }

        let mut roots: Vec<_> = sources.into_iter().collect();
        roots.sort_by(|a, b| a.0.cmp(&b.0));
        for (root, files) in roots {
            println!("  {} {}", "root".dimmed(), root.root_id());
            let mut files: Vec<_> = files.into_iter().collect();
            files.sort();
            for file in files {
                println!("    {} {}", "M".yellow(), file.display());
            }
        }
        for file in deleted {
            println!("  {} {}", "D".red(), file.display());
        }
    }

    Ok(())
}
