//! Progress counter for the processing pool (verbose mode)

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Callback invoked by processing workers with the number of items just finished.
pub type ProgressFn = Arc<dyn Fn(usize) + Send + Sync>;

/// Force a refresh of the bar (e.g. so the counter shows "0 files" immediately).
pub fn refresh_bar(pb: &ProgressBar) {
    if let Ok(mut bar) = pb.try_lock() {
        let _ = bar.refresh();
    }
}

/// Create a counter for unknown total (shows count without percentage)
pub fn create_counter(desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " files"
    )))
}

/// Update progress bar if available
/// Uses try_lock so workers never block on the bar; a contended update is dropped.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Create a progress callback that updates the bar, shared by all workers.
pub fn progress_callback(bar: &Option<ProgressBar>) -> Option<ProgressFn> {
    bar.as_ref().map(|bar| {
        let bar = Arc::clone(bar);
        Arc::new(move |n: usize| update_progress_bar(&bar, n)) as ProgressFn
    })
}
