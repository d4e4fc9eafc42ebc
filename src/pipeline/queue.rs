//! Shared work queue between the reader pool and the processing pool.
//!
//! Unbounded MPMC channel carrying [`QueueMessage`]s. Producers hold a [`WorkQueueSender`],
//! consumers a [`WorkQueueReceiver`]; both are cheap to clone. The end-of-stream sentinel can
//! be pushed at most once per queue, no matter how many sender clones exist.

use anyhow::{Result, anyhow};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use log::warn;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::types::{QueueMessage, WorkItem};

/// Consumer-side counters shared by all receiver handles of one queue.
#[derive(Debug, Default)]
pub struct QueueStats {
    pub dequeued: AtomicU64,
    pub timeouts: AtomicU64,
}

impl QueueStats {
    pub fn dequeued(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    pub fn timeouts(&self) -> u64 {
        self.timeouts.load(Ordering::Relaxed)
    }
}

/// Outcome of one bounded dequeue attempt.
#[derive(Debug, PartialEq)]
pub enum Poll<T> {
    Item(WorkItem<T>),
    EndOfStream,
    /// Nothing arrived within the timeout; retry.
    Timeout,
    /// Every sender is gone and the queue is drained.
    Disconnected,
}

/// Create a work queue and return its producer and consumer handles.
pub fn work_queue<T>() -> (WorkQueueSender<T>, WorkQueueReceiver<T>) {
    let (tx, rx) = unbounded();
    (
        WorkQueueSender {
            tx,
            end_sent: Arc::new(AtomicBool::new(false)),
        },
        WorkQueueReceiver {
            rx,
            stats: Arc::new(QueueStats::default()),
        },
    )
}

/// Producer side: reader workers and the reader pool coordinator.
pub struct WorkQueueSender<T> {
    tx: Sender<QueueMessage<T>>,
    end_sent: Arc<AtomicBool>,
}

// Manual impl: derive would require `T: Clone`.
impl<T> Clone for WorkQueueSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            end_sent: Arc::clone(&self.end_sent),
        }
    }
}

impl<T> WorkQueueSender<T> {
    pub fn push(&self, item: WorkItem<T>) -> Result<()> {
        if self.end_sent.load(Ordering::Acquire) {
            return Err(anyhow!(
                "push after end-of-stream: {} would never be processed",
                item.source_id
            ));
        }
        self.tx
            .send(QueueMessage::Item(item))
            .map_err(|_| anyhow!("work queue disconnected"))
    }

    /// Push the end-of-stream sentinel. Returns `Ok(false)` without sending if it was already
    /// pushed.
    pub fn push_end_of_stream(&self) -> Result<bool> {
        if self.end_sent.swap(true, Ordering::AcqRel) {
            warn!("end-of-stream already pushed; ignoring duplicate");
            return Ok(false);
        }
        self.tx
            .send(QueueMessage::EndOfStream)
            .map_err(|_| anyhow!("work queue disconnected"))?;
        Ok(true)
    }
}

/// Consumer side: processing workers.
pub struct WorkQueueReceiver<T> {
    rx: Receiver<QueueMessage<T>>,
    stats: Arc<QueueStats>,
}

impl<T> Clone for WorkQueueReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<T> WorkQueueReceiver<T> {
    /// Wait up to `timeout` for the next message.
    pub fn poll(&self, timeout: Duration) -> Poll<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(QueueMessage::Item(item)) => {
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                Poll::Item(item)
            }
            Ok(QueueMessage::EndOfStream) => Poll::EndOfStream,
            Err(RecvTimeoutError::Timeout) => {
                self.stats.timeouts.fetch_add(1, Ordering::Relaxed);
                Poll::Timeout
            }
            Err(RecvTimeoutError::Disconnected) => Poll::Disconnected,
        }
    }

    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }
}
