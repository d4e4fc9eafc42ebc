//! ctgpipe: parallel two-stage pipeline over a directory of CTG traces.
//!
//! Reader threads parse shards of the input directory onto a shared work queue; processing
//! threads either score each trace (results aggregated into a map) or render it to a chart.

pub mod ctg;
pub mod engine;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use pipeline::{ItemOperation, PayloadReader, TerminationFlag};

use std::path::Path;

/// Result alias used by public ctgpipe API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Score every parseable file in `dir` and return `source id → classification`.
///
/// `reader_factory` builds one reader per reader thread; `classify` runs on the processing
/// threads. Files that are not regular files or that the reader rejects are skipped and never
/// appear in the map.
///
/// ```ignore
/// let opts = PipelineOpts { num_threads: 4, ..Default::default() };
/// let classify = move |t: &CtgTrace| classifier.classify(t);
/// let scores = ctgpipe::run_scoring(dir, DictReader::new, classify, &opts)?;
/// ```
pub fn run_scoring<R, F, C>(
    dir: &Path,
    reader_factory: F,
    classify: C,
    opts: &PipelineOpts,
) -> Result<ResultMap>
where
    R: PayloadReader + 'static,
    F: Fn() -> R + Send + Sync + 'static,
    C: Fn(&R::Payload) -> String + Send + Sync + 'static,
{
    pipeline::run_scoring(dir, reader_factory, classify, opts)
}

/// Recreate `opts.output_dir` and render every parseable file in `dir` into it as
/// `<index>.png`, where the index comes from the file name (`42.txt` → `42.png`).
pub fn run_rendering<R, F, G>(
    dir: &Path,
    reader_factory: F,
    render: G,
    opts: &PipelineOpts,
) -> Result<RunSummary>
where
    R: PayloadReader + 'static,
    F: Fn() -> R + Send + Sync + 'static,
    G: Fn(&R::Payload, &Path) -> Result<()> + Send + Sync + 'static,
{
    pipeline::run_rendering(dir, reader_factory, render, opts)
}
