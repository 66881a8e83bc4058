pub mod config;
pub mod dump;
pub mod reset;
pub mod stats;

use crate::output;
use crate::storage::LoadOutcome;

/// Tell the user how the state file was read
pub fn report_outcome(outcome: &LoadOutcome) {
    match outcome {
        LoadOutcome::Missing => output::info("No state file yet; every target will be fully scanned"),
        LoadOutcome::Loaded(summary) => {
            if summary.skipped_targets > 0 || summary.skipped_roots > 0 {
                output::warning(&format!(
                    "Skipped {} unknown target(s) and {} unknown root(s)",
                    summary.skipped_targets, summary.skipped_roots
                ));
            }
        }
        LoadOutcome::VersionMismatch { found } => output::warning(&format!(
            "State file has format version {found}, expected {}; it will be ignored",
            crate::FORMAT_VERSION
        )),
        LoadOutcome::Discarded => {
            output::warning("State file is unreadable; it will be discarded on the next build");
        }
    }
}
