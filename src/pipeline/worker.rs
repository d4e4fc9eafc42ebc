//! Processing pool: workers poll the shared queue and apply a pluggable per-item operation.

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::Sender;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::types::{END_OF_FILES, ResultEntry, ResultMessage, WorkItem};
use crate::utils::config::PipelineConsts;

use super::context::WorkerContext;
use super::queue::{Poll, WorkQueueReceiver};

/// Per-item operation run by a processing worker. `Ok(Some(entry))` is forwarded to the result
/// channel when the pool emits results; `Ok(None)` means the operation was a side effect only.
pub trait ItemOperation<T>: Send + Sync {
    fn apply(&self, item: WorkItem<T>) -> Result<Option<ResultEntry>>;
}

/// Scoring operation: `source_id → classify(payload)`.
pub struct Scorer<F> {
    classify: F,
}

impl<F> Scorer<F> {
    pub fn new(classify: F) -> Self {
        Self { classify }
    }
}

impl<T, F> ItemOperation<T> for Scorer<F>
where
    F: Fn(&T) -> String + Send + Sync,
{
    fn apply(&self, item: WorkItem<T>) -> Result<Option<ResultEntry>> {
        let value = (self.classify)(&item.payload);
        Ok(Some(ResultEntry {
            key: item.source_id,
            value,
        }))
    }
}

/// Rendering operation: draws each payload to `<output_dir>/<index>.png`, where the index is
/// recovered from the source id (see [`chart_index`]).
pub struct Renderer<F> {
    output_dir: PathBuf,
    render: F,
}

impl<F> Renderer<F> {
    pub fn new(output_dir: impl Into<PathBuf>, render: F) -> Self {
        Self {
            output_dir: output_dir.into(),
            render,
        }
    }
}

impl<T, F> ItemOperation<T> for Renderer<F>
where
    F: Fn(&T, &Path) -> Result<()> + Send + Sync,
{
    fn apply(&self, item: WorkItem<T>) -> Result<Option<ResultEntry>> {
        let target = chart_path(&self.output_dir, &item.source_id)?;
        (self.render)(&item.payload, &target)
            .with_context(|| format!("render {} to {}", item.source_id, target.display()))?;
        info!("Graph for {} saved at {}", item.source_id, target.display());
        Ok(None)
    }
}

/// Numeric chart index of a source id: strip the `.txt` suffix and parse the rest as an integer.
pub fn chart_index(source_id: &str) -> Result<u64> {
    let stem = source_id
        .strip_suffix(PipelineConsts::SOURCE_SUFFIX)
        .ok_or_else(|| {
            anyhow!(
                "source id {:?} does not end in {:?}",
                source_id,
                PipelineConsts::SOURCE_SUFFIX
            )
        })?;
    stem.parse::<u64>()
        .with_context(|| format!("source id {:?} has no numeric index", source_id))
}

/// Output path for the chart of `source_id` inside `output_dir`.
pub fn chart_path(output_dir: &Path, source_id: &str) -> Result<PathBuf> {
    let index = chart_index(source_id)?;
    Ok(output_dir.join(format!("{index}.{}", PipelineConsts::CHART_EXTENSION)))
}

/// What a processing worker did before it terminated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub processed: usize,
    pub failed: usize,
    pub observed_end_of_stream: bool,
}

/// Single processing worker. Runs until the termination flag is set, a cancel is requested, it
/// dequeues end-of-stream, or the queue disconnects. Only the worker that dequeues end-of-stream
/// sets the flag and writes the end marker; the others notice the flag on their next poll.
pub fn processing_worker_loop<T, O>(
    worker_id: usize,
    queue_rx: WorkQueueReceiver<T>,
    op: Arc<O>,
    result_tx: Option<Sender<ResultMessage>>,
    ctx: WorkerContext,
) -> WorkerStats
where
    O: ItemOperation<T> + ?Sized,
{
    let mut stats = WorkerStats::default();
    loop {
        if ctx.flag.is_set() {
            debug!("worker {}: termination flag is set, exiting", worker_id);
            break;
        }
        if ctx.cancel.is_requested() {
            info!("worker {}: cancel requested, exiting", worker_id);
            ctx.flag.set();
            break;
        }

        match queue_rx.poll(ctx.poll_timeout) {
            Poll::Timeout => {
                debug!(
                    "worker {}: queue empty for {:?}, polling again",
                    worker_id, ctx.poll_timeout
                );
            }
            Poll::Disconnected => {
                warn!(
                    "worker {}: work queue closed without {}",
                    worker_id, END_OF_FILES
                );
                break;
            }
            Poll::EndOfStream => {
                info!("'{}' read from queue", END_OF_FILES);
                stats.observed_end_of_stream = true;
                if ctx.flag.set() {
                    info!("Termination flag set");
                }
                if let Some(tx) = &result_tx
                    && tx.send(ResultMessage::EndMarker).is_err()
                {
                    warn!("worker {}: result channel closed before end marker", worker_id);
                }
                break;
            }
            Poll::Item(item) => {
                let source_id = item.source_id.clone();
                match op.apply(item) {
                    Ok(entry) => {
                        if let (Some(tx), Some(entry)) = (&result_tx, entry)
                            && tx.send(ResultMessage::Entry(entry)).is_err()
                        {
                            warn!("worker {}: result channel closed, exiting", worker_id);
                            break;
                        }
                        stats.processed += 1;
                        debug!("processed {}", source_id);
                        if let Some(cb) = &ctx.on_processed {
                            cb(1);
                        }
                    }
                    Err(e) => {
                        error!("Failed to process {}: {:#}", source_id, e);
                        stats.failed += 1;
                        ctx.failed_items
                            .lock()
                            .unwrap()
                            .push((source_id.clone(), format!("{:#}", e)));
                        if ctx.strict {
                            ctx.first_error
                                .lock()
                                .unwrap()
                                .get_or_insert_with(|| {
                                    format!("strict mode: {}: {:#}", source_id, e)
                                });
                            ctx.flag.set();
                            break;
                        }
                    }
                }
            }
        }
    }
    stats
}

/// Spawn `num_workers` processing threads sharing `queue_rx` and `op`. Pass `result_tx` only in
/// scoring mode; the caller must drop its own result sender afterwards so the aggregator can
/// detect a pool that exited without an end marker.
pub fn spawn_processing_workers<T, O>(
    num_workers: usize,
    queue_rx: WorkQueueReceiver<T>,
    op: Arc<O>,
    result_tx: Option<&Sender<ResultMessage>>,
    ctx: &WorkerContext,
) -> Result<Vec<JoinHandle<WorkerStats>>>
where
    T: Send + 'static,
    O: ItemOperation<T> + 'static,
{
    (0..num_workers)
        .map(|worker_id| {
            let queue_rx = queue_rx.clone();
            let op = Arc::clone(&op);
            let result_tx = result_tx.cloned();
            let ctx = ctx.clone();
            thread::Builder::new()
                .name(format!("worker-{worker_id}"))
                .spawn(move || processing_worker_loop(worker_id, queue_rx, op, result_tx, ctx))
                .with_context(|| format!("spawn processing thread {worker_id}"))
        })
        .collect()
}
