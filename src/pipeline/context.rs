//! Pipeline context: channels, termination flag and shared ledgers handed to the reader and
//! processing pools.

use crossbeam_channel::{Receiver, Sender, unbounded};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::PipelineOpts;
use crate::engine::progress::ProgressFn;
use crate::types::ResultMessage;

use super::flag::{CancelSignal, TerminationFlag};
use super::queue::{WorkQueueReceiver, WorkQueueSender, work_queue};

/// Entries readers skipped, with the reason.
pub type SkippedPaths = Arc<Mutex<Vec<(PathBuf, String)>>>;

/// Items the processing pool failed on: (source id, error).
pub type FailedItems = Arc<Mutex<Vec<(String, String)>>>;

/// Shared context for reader workers: where the shard names resolve and where skips are recorded.
#[derive(Clone)]
pub struct ReaderContext {
    pub dir: PathBuf,
    pub skipped_paths: SkippedPaths,
    pub cancel: CancelSignal,
}

/// Shared context for processing workers.
#[derive(Clone)]
pub struct WorkerContext {
    pub flag: TerminationFlag,
    pub cancel: CancelSignal,
    pub poll_timeout: Duration,
    pub strict: bool,
    pub first_error: Arc<Mutex<Option<String>>>,
    pub failed_items: FailedItems,
    pub on_processed: Option<ProgressFn>,
}

/// Channels and shared state for one run. Readers get `queue_tx` and `reader_ctx`; workers get
/// `queue_rx`, `result_tx` (scoring only) and `worker_ctx`; the aggregator gets `result_rx`.
pub struct PipelineChannels<T> {
    pub queue_tx: WorkQueueSender<T>,
    pub queue_rx: WorkQueueReceiver<T>,
    pub result_tx: Sender<ResultMessage>,
    pub result_rx: Receiver<ResultMessage>,
    pub reader_ctx: ReaderContext,
    pub worker_ctx: WorkerContext,
}

pub fn create_pipeline_channels<T>(
    dir: &Path,
    opts: &PipelineOpts,
    on_processed: Option<ProgressFn>,
) -> PipelineChannels<T> {
    let (queue_tx, queue_rx) = work_queue::<T>();
    let (result_tx, result_rx) = unbounded::<ResultMessage>();
    let cancel = CancelSignal::from(opts.cancel.clone());

    let reader_ctx = ReaderContext {
        dir: dir.to_path_buf(),
        skipped_paths: Arc::new(Mutex::new(Vec::new())),
        cancel: cancel.clone(),
    };
    let worker_ctx = WorkerContext {
        flag: TerminationFlag::new(),
        cancel,
        poll_timeout: opts.poll_timeout,
        strict: opts.strict,
        first_error: Arc::new(Mutex::new(None)),
        failed_items: Arc::new(Mutex::new(Vec::new())),
        on_processed,
    };

    PipelineChannels {
        queue_tx,
        queue_rx,
        result_tx,
        result_rx,
        reader_ctx,
        worker_ctx,
    }
}
