//! Public and internal types for the ctgpipe API and pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::utils::config::{PackagePaths, PipelineConsts, WorkerThreadLimits};

/// Name the end-of-stream sentinel is logged under.
pub const END_OF_FILES: &str = "end_of_files";

/// One parsed input file in flight between the reader and processing pools.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkItem<T> {
    /// File name (relative to the input directory) the payload came from.
    pub source_id: String,
    pub payload: T,
}

/// What travels on the shared work queue: items, then a single end-of-stream sentinel.
#[derive(Clone, Debug, PartialEq)]
pub enum QueueMessage<T> {
    Item(WorkItem<T>),
    EndOfStream,
}

/// Per-item output of the scoring pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub key: String,
    pub value: String,
}

/// What travels on the result channel. `EndMarker` is written exactly once per scoring run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResultMessage {
    Entry(ResultEntry),
    EndMarker,
}

/// Map of source id → classification returned by a scoring run.
pub type ResultMap = HashMap<String, String>;

/// Options for [`run_scoring`](crate::run_scoring) and [`run_rendering`](crate::run_rendering).
#[derive(Clone, Debug)]
pub struct PipelineOpts {
    /// Processing worker count (M). Also the reader count unless `reader_threads` is set.
    pub num_threads: usize,
    /// Reader worker count (P). When None, uses `num_threads`.
    pub reader_threads: Option<usize>,
    /// Bounded wait of a single dequeue attempt.
    pub poll_timeout: Duration,
    /// Strict mode: a failed item fails the whole run (reported after all threads join).
    pub strict: bool,
    /// Show a progress counter for processed items.
    pub verbose: bool,
    /// Rendering output directory. Recreated empty at the start of a rendering run.
    pub output_dir: PathBuf,
    /// External cancellation (e.g. Ctrl+C). Read-only for the pipeline: a finished run leaves
    /// it untouched, so the same options can be reused.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            num_threads: WorkerThreadLimits::current().default_threads(),
            reader_threads: None,
            poll_timeout: PipelineConsts::POLL_TIMEOUT,
            strict: false,
            verbose: false,
            output_dir: PathBuf::from(PackagePaths::get().graphs_dirname()),
            cancel: None,
        }
    }
}

impl PipelineOpts {
    /// Effective reader worker count.
    pub fn readers(&self) -> usize {
        self.reader_threads.unwrap_or(self.num_threads)
    }
}

/// Counts reported by a finished run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries listed in the input directory.
    pub listed: usize,
    /// Work items pushed by the reader pool.
    pub enqueued: usize,
    /// Items processed successfully by the worker pool.
    pub processed: usize,
    /// Items whose operation returned an error.
    pub failed: usize,
    /// Entries skipped by readers (not a regular file, unreadable).
    pub skipped: usize,
    /// Work items taken off the queue by the worker pool.
    pub dequeued: u64,
    /// Dequeue attempts that timed out on an empty queue.
    pub poll_timeouts: u64,
}
