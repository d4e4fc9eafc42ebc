use anyhow::Result;
use std::sync::{Arc, Mutex};

use crate::PipelineOpts;
use crate::utils::Colors;

use super::context::{FailedItems, SkippedPaths};

/// Check pipeline result: if strict and a first error was recorded, return it; otherwise log
/// skipped paths and failed items. Call after joining all workers.
pub fn check_for_initial_error_or_skipped_paths(
    opts: &PipelineOpts,
    first_error: &Arc<Mutex<Option<String>>>,
    skipped_paths: &SkippedPaths,
    failed_items: &FailedItems,
) -> Result<()> {
    if opts.strict
        && let Some(msg) = first_error.lock().unwrap().take()
    {
        return Err(anyhow::anyhow!("{}", msg));
    }

    let skipped = skipped_paths.lock().unwrap();
    if !skipped.is_empty() {
        log::warn!(
            "{}",
            Colors::colorize(
                Colors::SKIPPED,
                &format!(
                    "Skipped {} entries (not a regular file or no data)",
                    skipped.len()
                )
            )
        );
        if opts.verbose {
            for (p, reason) in skipped.iter() {
                eprintln!("  skipped: {} ({})", p.display(), reason);
            }
        }
    }

    let failed = failed_items.lock().unwrap();
    if !failed.is_empty() {
        log::warn!(
            "{}",
            Colors::colorize(
                Colors::MISMATCHED,
                &format!("Failed to process {} items", failed.len())
            )
        );
        if opts.verbose {
            for (source_id, err) in failed.iter() {
                eprintln!("  failed: {} ({})", source_id, err);
            }
        }
    }
    Ok(())
}
