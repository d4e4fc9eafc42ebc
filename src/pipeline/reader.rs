//! Reader pool: each worker parses its shard of files and pushes work items onto the queue.

use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::types::WorkItem;

use super::context::ReaderContext;
use super::queue::WorkQueueSender;
use super::shard::shard_files;

/// Parses one input file. Returns `None` when the file cannot be read or parsed; the caller
/// logs and drops it. One reader is created per reader worker.
pub trait PayloadReader: Send {
    type Payload: Send + 'static;

    fn read(&mut self, path: &Path) -> Option<Self::Payload>;
}

impl<F, T> PayloadReader for F
where
    F: FnMut(&Path) -> Option<T> + Send,
    T: Send + 'static,
{
    type Payload = T;

    fn read(&mut self, path: &Path) -> Option<T> {
        self(path)
    }
}

/// Read every file of `shard`, pushing one item per successful parse. Returns the number pushed.
/// Non-regular entries and empty parses are recorded in `ctx.skipped_paths` and skipped. Stops
/// early once a cancel is requested.
pub fn read_shard<R: PayloadReader>(
    reader: &mut R,
    shard: &[String],
    ctx: &ReaderContext,
    queue_tx: &WorkQueueSender<R::Payload>,
) -> usize {
    let mut pushed = 0_usize;
    for (i, name) in shard.iter().enumerate() {
        if ctx.cancel.is_requested() {
            info!("Cancel requested; {} files of this shard left unread", shard.len() - i);
            break;
        }
        let path = ctx.dir.join(name);

        if !path.is_file() {
            warn!("{} is not a file; skipping", path.display());
            ctx.skipped_paths
                .lock()
                .unwrap()
                .push((path, "not a regular file".to_string()));
            continue;
        }

        match reader.read(&path) {
            Some(payload) => {
                let item = WorkItem {
                    source_id: name.clone(),
                    payload,
                };
                if let Err(e) = queue_tx.push(item) {
                    warn!("{}: {}", path.display(), e);
                    break;
                }
                pushed += 1;
            }
            None => {
                warn!("Data of file {} is empty; dropped", path.display());
                ctx.skipped_paths
                    .lock()
                    .unwrap()
                    .push((path.clone(), "reader returned no data".to_string()));
            }
        }
        debug!("File {} read", path.display());
    }
    pushed
}

/// Spawn one reader thread per shard. Each thread builds its own reader from `reader_factory`.
pub fn spawn_reader_workers<R, F>(
    shards: Vec<Vec<String>>,
    reader_factory: Arc<F>,
    ctx: &ReaderContext,
    queue_tx: &WorkQueueSender<R::Payload>,
) -> Result<Vec<JoinHandle<usize>>>
where
    R: PayloadReader + 'static,
    F: Fn() -> R + Send + Sync + 'static,
{
    shards
        .into_iter()
        .enumerate()
        .map(|(reader_id, shard)| {
            let factory = Arc::clone(&reader_factory);
            let ctx = ctx.clone();
            let queue_tx = queue_tx.clone();
            thread::Builder::new()
                .name(format!("reader-{reader_id}"))
                .spawn(move || {
                    let mut reader = factory();
                    read_shard(&mut reader, &shard, &ctx, &queue_tx)
                })
                .with_context(|| format!("spawn reader thread {reader_id}"))
        })
        .collect()
}

/// Reader pool coordinator: shard `files` across `num_readers` threads, wait for all of them,
/// then push the single end-of-stream sentinel. Returns the number of items enqueued.
///
/// Takes `queue_tx` by value so the coordinator's sender is dropped on return; if spawning
/// fails, consumers see the queue disconnect instead of waiting for a sentinel.
pub fn fill_queue<R, F>(
    files: &[String],
    reader_factory: Arc<F>,
    num_readers: usize,
    ctx: &ReaderContext,
    queue_tx: WorkQueueSender<R::Payload>,
) -> Result<usize>
where
    R: PayloadReader + 'static,
    F: Fn() -> R + Send + Sync + 'static,
{
    let shards = shard_files(files, num_readers);
    debug!(
        "Sharded {} files across {} readers: {:?}",
        files.len(),
        shards.len(),
        shards.iter().map(Vec::len).collect::<Vec<_>>()
    );

    let handles = spawn_reader_workers(shards, reader_factory, ctx, &queue_tx)?;
    info!("File reading threads started");

    let mut enqueued = 0_usize;
    let mut panicked = 0_usize;
    for h in handles {
        match h.join() {
            Ok(n) => enqueued += n,
            Err(_) => panicked += 1,
        }
    }
    info!("File reading threads have finished executing");

    queue_tx.push_end_of_stream()?;
    drop(queue_tx);

    if panicked > 0 {
        return Err(anyhow!("{} reader thread(s) panicked", panicked));
    }
    Ok(enqueued)
}
