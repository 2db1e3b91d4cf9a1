//! Time-bounded FIFO of arrival timestamps.

use std::collections::VecDeque;

use dis_ingest_types::WINDOW_MS;
use parking_lot::Mutex;

/// Upper bound on expired entries removed by a single [`SlidingWindow::push`].
///
/// Keeps the write path O(1) while still bounding memory when nobody reads.
pub(crate) const MAX_PRUNE_ON_PUSH: usize = 8;

/// Arrival timestamps (epoch ms) kept in ascending order, pruned lazily from
/// the oldest end.
///
/// In-order arrivals append in O(1). A timestamp older than the newest entry,
/// e.g. after the wall clock steps back, is inserted at its sorted position so
/// pruning from the front still removes every expired entry.
#[derive(Debug, Default)]
pub struct SlidingWindow {
    entries: Mutex<VecDeque<u64>>,
}

impl SlidingWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a timestamp and drop a bounded number of entries that fell out
    /// of the window relative to the newest entry.
    pub fn push(&self, timestamp_ms: u64) {
        let mut entries = self.entries.lock();
        let newest = match entries.back().copied() {
            Some(newest) if timestamp_ms < newest => {
                let idx = entries.partition_point(|&t| t <= timestamp_ms);
                entries.insert(idx, timestamp_ms);
                newest
            }
            _ => {
                entries.push_back(timestamp_ms);
                timestamp_ms
            }
        };
        let cutoff = cutoff_for(newest);
        for _ in 0..MAX_PRUNE_ON_PUSH {
            match entries.front() {
                Some(&oldest) if oldest < cutoff => {
                    entries.pop_front();
                }
                _ => break,
            }
        }
    }

    /// Drop every entry older than `now_ms - WINDOW_MS` and return how many remain.
    pub fn prune_and_count(&self, now_ms: u64) -> u64 {
        let cutoff = cutoff_for(now_ms);
        let mut entries = self.entries.lock();
        while let Some(&oldest) = entries.front() {
            if oldest >= cutoff {
                break;
            }
            entries.pop_front();
        }
        entries.len() as u64
    }

    /// Number of retained entries, without pruning.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Oldest timestamp still inside the window ending at `now_ms`.
fn cutoff_for(now_ms: u64) -> u64 {
    now_ms.saturating_sub(WINDOW_MS)
}
