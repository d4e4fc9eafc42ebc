//! Input listing and output directory housekeeping.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// List the direct children of `dir` (files and non-files alike) in directory order.
/// Names are relative to `dir`; readers decide what to skip. Entries whose name is not valid
/// UTF-8 are left out with a warning. Fails if `dir` cannot be read.
pub fn list_input_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("list input directory {}", dir.display()))?;
        match entry.file_name().to_str() {
            Some(name) => names.push(name.to_string()),
            None => warn!("{} has a non-UTF-8 name; skipping", entry.path().display()),
        }
    }
    if names.is_empty() && !dir.is_dir() {
        anyhow::bail!("input directory {} does not exist", dir.display());
    }
    debug!("Listed {} entries in {}", names.len(), dir.display());
    Ok(names)
}

/// Remove `dir` with all its contents if it exists, then create it empty.
pub fn recreate_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).with_context(|| format!("clear directory {}", dir.display()))?;
        info!("Directory {} exists and cleared", dir.display());
    }
    fs::create_dir_all(dir).with_context(|| format!("create directory {}", dir.display()))?;
    debug!("Created directory {}", dir.display());
    Ok(())
}
