//! Pipeline components: work queue, termination flag, sharding, reader and processing pools,
//! result aggregation, and the run orchestrators.

pub mod aggregator;
pub mod context;
pub mod error_handler;
pub mod flag;
pub mod orchestrator;
pub mod queue;
pub mod reader;
pub mod shard;
pub mod worker;

pub use aggregator::collect_results;
pub use context::{
    FailedItems, PipelineChannels, ReaderContext, SkippedPaths, WorkerContext,
    create_pipeline_channels,
};
pub use error_handler::check_for_initial_error_or_skipped_paths;
pub use flag::{CancelSignal, TerminationFlag};
pub use orchestrator::{
    PipelineHandles, run_pipeline, run_rendering, run_scoring, shutdown_pipeline_handles,
};
pub use queue::{Poll, QueueStats, WorkQueueReceiver, WorkQueueSender, work_queue};
pub use reader::{PayloadReader, fill_queue, read_shard, spawn_reader_workers};
pub use shard::shard_files;
pub use worker::{
    ItemOperation, Renderer, Scorer, WorkerStats, chart_index, chart_path,
    processing_worker_loop, spawn_processing_workers,
};
