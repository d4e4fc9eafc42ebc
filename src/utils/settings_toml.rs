//! Load `.ctgpipe.toml` from the working directory (CLI only). Lib callers pass
//! [`PipelineOpts`] directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::PipelineOpts;
use crate::engine::arg_parser::RunArgs;

#[derive(Debug, Default, Deserialize)]
pub struct SettingsToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    dir: Option<String>,
    threads: Option<usize>,
    reader_threads: Option<usize>,
    graphs_dir: Option<String>,
    expected: Option<String>,
    comparison: Option<String>,
    poll_timeout_ms: Option<u64>,
    strict: Option<bool>,
    verbose: Option<bool>,
}

/// Load the settings file from `dir` if present. Returns None if the file is missing or invalid.
pub fn load_settings_toml(dir: &Path, filename: &str) -> Option<SettingsToml> {
    let path = dir.join(filename);
    let s = std::fs::read_to_string(&path).ok()?;
    parse_settings_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub fn parse_settings_toml(s: &str) -> Result<SettingsToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $target:expr, $sec_field:ident => $target_field:ident) => {
        if let Some(v) = $sec.$sec_field {
            $target.$target_field = v;
        }
    };
}

/// Apply file settings to run args and pipeline opts (only fields present in the file).
/// Call before applying CLI flags so the command line wins.
pub fn apply_file_to_opts(file: &SettingsToml, args: &mut RunArgs, opts: &mut PipelineOpts) {
    let sec = &file.settings;
    if let Some(ref d) = sec.dir {
        args.dir = PathBuf::from(d);
    }
    if let Some(ref g) = sec.graphs_dir {
        opts.output_dir = PathBuf::from(g);
    }
    if let Some(ref e) = sec.expected {
        args.expected = Some(PathBuf::from(e));
    }
    if let Some(ref c) = sec.comparison {
        args.comparison = PathBuf::from(c);
    }
    if let Some(ms) = sec.poll_timeout_ms {
        opts.poll_timeout = Duration::from_millis(ms);
    }
    if sec.reader_threads.is_some() {
        opts.reader_threads = sec.reader_threads;
    }
    apply_file_opt!(sec, opts, threads => num_threads);
    apply_file_opt!(sec, opts, strict => strict);
    apply_file_opt!(sec, opts, verbose => verbose);
}
