//! Application configuration constants.
//! Tuning and file names in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    settings_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    pub const DEFAULT_INPUT_DIR: &'static str = "./ctg_files";
    pub const GRAPHS_DIR: &'static str = "graphs";
    pub const COMPARISON_FILENAME: &'static str = "comparison.json";

    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                settings_filename: format!(".{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Settings file looked up in the working directory (CLI only).
    pub fn settings_filename(&self) -> &str {
        &self.settings_filename
    }

    pub fn graphs_dirname(&self) -> &str {
        Self::GRAPHS_DIR
    }

    pub fn comparison_filename(&self) -> &str {
        Self::COMPARISON_FILENAME
    }
}

// ---- Worker threads ----

/// Thread limits for the reader and processing pools.
/// Use [`WorkerThreadLimits::current()`] to fill `all_threads` from rayon; the rest are const.
#[derive(Clone, Copy, Debug)]
pub struct WorkerThreadLimits {
    /// Available threads (from rayon); set by [`WorkerThreadLimits::current()`].
    pub all_threads: usize,
    /// Upper bound for the default pool size.
    pub max: usize,
    /// Lower bound for the default pool size.
    pub floor: usize,
}

impl Default for WorkerThreadLimits {
    fn default() -> Self {
        Self {
            all_threads: 0, // use current() to set from rayon
            max: Self::MAX_THREADS,
            floor: Self::FLOOR_THREADS,
        }
    }
}

impl WorkerThreadLimits {
    pub const MAX_THREADS: usize = 8;
    pub const FLOOR_THREADS: usize = 1;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            ..Self::default()
        }
    }

    /// Pool size used when the caller does not pick one: available threads, clamped to
    /// `[floor, max]`.
    pub fn default_threads(&self) -> usize {
        self.all_threads.clamp(self.floor, self.max)
    }
}

// ---- Pipeline ----

pub struct PipelineConsts;

impl PipelineConsts {
    /// Bounded wait of one dequeue attempt on the shared work queue.
    pub const POLL_TIMEOUT: Duration = Duration::from_secs(1);
    /// Suffix stripped from a source id to recover the chart index while rendering.
    pub const SOURCE_SUFFIX: &'static str = ".txt";
    /// Extension of rendered charts.
    pub const CHART_EXTENSION: &'static str = "png";
}
