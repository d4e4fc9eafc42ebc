use anyhow::{Result, anyhow};
use crossbeam_channel::Receiver;
use log::{debug, warn};

use crate::types::{ResultEntry, ResultMap, ResultMessage};

fn insert_entry(results: &mut ResultMap, entry: ResultEntry) {
    if let Some(previous) = results.insert(entry.key.clone(), entry.value) {
        warn!("Duplicate result for {}; replacing {:?}", entry.key, previous);
    }
}

/// Drain the result channel into a map until the end marker arrives.
///
/// Entries are inserted in arrival order; a duplicate key overwrites the earlier value. After
/// the single end marker, entries from workers that were still mid-item are drained until every
/// sender is dropped, so the caller must not hold a sender. Fails if the senders disappear
/// before the marker, which happens when the pool was cancelled or stopped on an error.
pub fn collect_results(result_rx: &Receiver<ResultMessage>) -> Result<ResultMap> {
    let mut results = ResultMap::new();
    loop {
        match result_rx.recv() {
            Ok(ResultMessage::Entry(entry)) => insert_entry(&mut results, entry),
            Ok(ResultMessage::EndMarker) => {
                debug!("End marker read from result channel");
                break;
            }
            Err(_) => {
                return Err(anyhow!(
                    "result channel closed before end marker ({} results received)",
                    results.len()
                ));
            }
        }
    }

    let before = results.len();
    for msg in result_rx.iter() {
        match msg {
            ResultMessage::Entry(entry) => insert_entry(&mut results, entry),
            ResultMessage::EndMarker => warn!("Ignoring unexpected second end marker"),
        }
    }
    if results.len() > before {
        debug!(
            "{} results arrived after the end marker",
            results.len() - before
        );
    }
    Ok(results)
}
