use clap::Parser;
use std::path::PathBuf;

use crate::utils::config::PackagePaths;

/// Parallel CTG pipeline: score a directory of traces or render each one as a chart.
#[derive(Clone, Parser)]
#[command(name = "ctgpipe")]
#[command(about = "Score CTG traces in parallel; use --visualize to render charts instead.")]
pub struct Cli {
    /// Directory with trace files. Default: ./ctg_files.
    #[arg(long, short, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Processing worker count (also the reader count unless --reader-threads is set).
    #[arg(long, short, value_parser = clap::value_parser!(usize))]
    pub threads: Option<usize>,

    /// Reader worker count.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub reader_threads: Option<usize>,

    /// Render each trace to <graphs-dir>/<index>.png instead of scoring.
    #[arg(long, alias = "vizualize")]
    pub visualize: bool,

    /// JSON file with expected classifications to compare the scores against.
    #[arg(long, short, value_name = "FILE")]
    pub expected: Option<PathBuf>,

    /// Where to write the comparison report. Default: comparison.json.
    #[arg(long, short, value_name = "FILE")]
    pub comparison: Option<PathBuf>,

    /// Output directory for charts. Recreated on every --visualize run. Default: graphs.
    #[arg(long, short, value_name = "DIR")]
    pub graphs_dir: Option<PathBuf>,

    /// Bounded wait of one queue poll, in milliseconds.
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub poll_timeout_ms: Option<u64>,

    /// Strict mode: fail the run on the first item that cannot be processed.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub strict: Option<bool>,

    /// Verbose output (debug logs and a progress counter).
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

/// Run-level settings that are not pipeline options: what to run and where reports go.
#[derive(Clone, Debug)]
pub struct RunArgs {
    pub dir: PathBuf,
    pub visualize: bool,
    pub expected: Option<PathBuf>,
    pub comparison: PathBuf,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(PackagePaths::DEFAULT_INPUT_DIR),
            visualize: false,
            expected: None,
            comparison: PathBuf::from(PackagePaths::get().comparison_filename()),
        }
    }
}
