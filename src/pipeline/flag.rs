use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared shutdown signal for the processing pool.
///
/// Owned by one run. Set by the worker that dequeues end-of-stream, on a strict-mode failure,
/// or once a cancel request is seen, and read by every worker before each dequeue attempt.
/// Once set it stays set; setting again is a no-op.
#[derive(Clone, Debug, Default)]
pub struct TerminationFlag(Arc<AtomicBool>);

impl TerminationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. Returns true if this call flipped it from unset to set.
    pub fn set(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

}

/// Caller-owned cancellation request (e.g. Ctrl+C). The pipeline only reads it, so the same
/// atomic can be handed to several runs.
#[derive(Clone, Debug, Default)]
pub struct CancelSignal(Option<Arc<AtomicBool>>);

impl CancelSignal {
    pub fn is_requested(&self) -> bool {
        self.0.as_ref().is_some_and(|c| c.load(Ordering::Acquire))
    }
}

impl From<Option<Arc<AtomicBool>>> for CancelSignal {
    fn from(inner: Option<Arc<AtomicBool>>) -> Self {
        Self(inner)
    }
}
