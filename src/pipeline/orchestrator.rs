use anyhow::{Result, anyhow, bail};
use log::{debug, info, warn};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;

use crate::engine::progress::{ProgressBar, create_counter, progress_callback, refresh_bar};
use crate::types::{PipelineOpts, ResultMap, ResultMessage, RunSummary};
use crate::utils::{list_input_files, recreate_dir};

use super::aggregator::collect_results;
use super::context::{FailedItems, SkippedPaths, create_pipeline_channels};
use super::error_handler::check_for_initial_error_or_skipped_paths;
use super::flag::{CancelSignal, TerminationFlag};
use super::queue::QueueStats;
use super::reader::{PayloadReader, fill_queue};
use super::worker::{ItemOperation, Renderer, Scorer, WorkerStats, spawn_processing_workers};

/// Handles returned by [`run_pipeline`] once the reader pool has finished. The caller drains
/// `result_rx` (scoring) and then joins `worker_handles`.
pub struct PipelineHandles {
    pub result_rx: Receiver<ResultMessage>,
    pub worker_handles: Vec<JoinHandle<WorkerStats>>,
    pub flag: TerminationFlag,
    pub cancel: CancelSignal,
    pub queue_stats: Arc<QueueStats>,
    pub first_error: Arc<Mutex<Option<String>>>,
    pub skipped_paths: SkippedPaths,
    pub failed_items: FailedItems,
    pub progress: Option<ProgressBar>,
    pub listed: usize,
    pub enqueued: usize,
}

/// Reject worker counts a run cannot make progress with. Runs before any filesystem work.
pub fn validate_worker_counts(opts: &PipelineOpts) -> Result<()> {
    if opts.num_threads == 0 || opts.readers() == 0 {
        bail!(
            "worker counts must be at least 1 (processing: {}, readers: {})",
            opts.num_threads,
            opts.readers()
        );
    }
    Ok(())
}

fn cancelled_error(what: &str) -> anyhow::Error {
    anyhow!("{} cancelled before all files were processed", what)
}

/// Start the processing pool, run the reader pool to completion, and push end-of-stream.
///
/// Processing workers start before the readers so items are consumed while files are still
/// being parsed. Results go to `result_rx` only when `emit_results` is set.
pub fn run_pipeline<R, F, O>(
    dir: &Path,
    reader_factory: F,
    op: O,
    emit_results: bool,
    opts: &PipelineOpts,
) -> Result<PipelineHandles>
where
    R: PayloadReader + 'static,
    F: Fn() -> R + Send + Sync + 'static,
    O: ItemOperation<R::Payload> + 'static,
{
    validate_worker_counts(opts)?;

    let files = list_input_files(dir)?;
    info!("Found {} entries in {}", files.len(), dir.display());

    let progress = opts.verbose.then(|| {
        let bar = create_counter("Processing");
        refresh_bar(&bar);
        bar
    });
    let channels =
        create_pipeline_channels::<R::Payload>(dir, opts, progress_callback(&progress));
    let queue_stats = channels.queue_rx.stats();

    let worker_handles = spawn_processing_workers(
        opts.num_threads,
        channels.queue_rx,
        Arc::new(op),
        emit_results.then_some(&channels.result_tx),
        &channels.worker_ctx,
    )?;
    // Dropping the last sender lets the aggregator see a pool that exited without an end marker.
    drop(channels.result_tx);
    info!("Working threads started");

    let filled = fill_queue(
        &files,
        Arc::new(reader_factory),
        opts.readers(),
        &channels.reader_ctx,
        channels.queue_tx,
    );
    let enqueued = match filled {
        Ok(n) => n,
        Err(e) => {
            // Workers may already be gone (cancel, strict failure); report why they stopped.
            channels.worker_ctx.flag.set();
            let stopped_early = match shutdown_pipeline_handles(worker_handles) {
                Ok(stats) => !stats.observed_end_of_stream,
                Err(join_err) => {
                    warn!("{:#}", join_err);
                    false
                }
            };
            if let Some(msg) = channels.worker_ctx.first_error.lock().unwrap().take() {
                return Err(anyhow!("{}", msg));
            }
            if channels.worker_ctx.cancel.is_requested() {
                return Err(e.context(cancelled_error("run")));
            }
            if stopped_early {
                return Err(e.context("processing stopped before the reader pool finished"));
            }
            return Err(e);
        }
    };
    debug!("Reader pool enqueued {} items", enqueued);

    Ok(PipelineHandles {
        result_rx: channels.result_rx,
        worker_handles,
        flag: channels.worker_ctx.flag,
        cancel: channels.worker_ctx.cancel,
        queue_stats,
        first_error: channels.worker_ctx.first_error,
        skipped_paths: channels.reader_ctx.skipped_paths,
        failed_items: channels.worker_ctx.failed_items,
        progress,
        listed: files.len(),
        enqueued,
    })
}

/// Join all processing workers and sum their stats.
pub fn shutdown_pipeline_handles(
    worker_handles: Vec<JoinHandle<WorkerStats>>,
) -> Result<WorkerStats> {
    let mut total = WorkerStats::default();
    let mut panicked = 0_usize;
    for h in worker_handles {
        match h.join() {
            Ok(stats) => {
                total.processed += stats.processed;
                total.failed += stats.failed;
                total.observed_end_of_stream |= stats.observed_end_of_stream;
            }
            Err(_) => panicked += 1,
        }
    }
    info!("Working threads have finished executing");
    if panicked > 0 {
        return Err(anyhow!("{} processing thread(s) panicked", panicked));
    }
    Ok(total)
}

fn summarize(handles: &PipelineHandles, stats: &WorkerStats) -> RunSummary {
    RunSummary {
        listed: handles.listed,
        enqueued: handles.enqueued,
        processed: stats.processed,
        failed: stats.failed,
        skipped: handles.skipped_paths.lock().unwrap().len(),
        dequeued: handles.queue_stats.dequeued(),
        poll_timeouts: handles.queue_stats.timeouts(),
    }
}

/// Scoring run: classify every parseable file in `dir` and return `source id → classification`.
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
    validate_worker_counts(opts)?;
    let mut handles = run_pipeline(dir, reader_factory, Scorer::new(classify), true, opts)?;

    let collected = collect_results(&handles.result_rx);
    let stats = shutdown_pipeline_handles(std::mem::take(&mut handles.worker_handles))?;
    if let Some(bar) = &handles.progress {
        refresh_bar(bar);
    }
    check_for_initial_error_or_skipped_paths(
        opts,
        &handles.first_error,
        &handles.skipped_paths,
        &handles.failed_items,
    )?;
    // A partial map is never returned once a cancel was requested, even if a worker still
    // reached end-of-stream.
    if handles.cancel.is_requested() {
        return Err(match collected {
            Ok(partial) => anyhow!(
                "scoring cancelled before all files were processed ({} results discarded)",
                partial.len()
            ),
            Err(e) => e.context(cancelled_error("scoring")),
        });
    }
    let results = collected?;

    debug!("{:?}", summarize(&handles, &stats));
    info!("Scored {} files", results.len());
    Ok(results)
}

/// Rendering run: recreate `opts.output_dir`, then render every parseable file in `dir` into it.
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
    validate_worker_counts(opts)?;
    recreate_dir(&opts.output_dir)?;

    let renderer = Renderer::new(opts.output_dir.clone(), render);
    let mut handles = run_pipeline(dir, reader_factory, renderer, false, opts)?;

    let stats = shutdown_pipeline_handles(std::mem::take(&mut handles.worker_handles))?;
    if let Some(bar) = &handles.progress {
        refresh_bar(bar);
    }
    check_for_initial_error_or_skipped_paths(
        opts,
        &handles.first_error,
        &handles.skipped_paths,
        &handles.failed_items,
    )?;
    if handles.cancel.is_requested() {
        return Err(cancelled_error("rendering"));
    }

    let summary = summarize(&handles, &stats);
    info!(
        "Rendered {} charts into {}",
        summary.processed,
        opts.output_dir.display()
    );
    Ok(summary)
}
