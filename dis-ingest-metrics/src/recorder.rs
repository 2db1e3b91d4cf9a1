//! Per-kind sliding windows, watermark, and pipeline counters.

use std::sync::atomic::{AtomicU64, Ordering};

use dis_ingest_types::{current_timestamp_ms, PduKind, PipelineCounters, RealTimeMetrics};

use crate::window::SlidingWindow;

/// Watermark value before the first record.
const NO_ARRIVAL: u64 = u64::MAX;

/// Thread-safe recorder of PDU arrivals.
///
/// Construct one and share it behind an `Arc` between the receive loop and
/// any readers. All methods take `&self`; no external locking is needed.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use dis_ingest_metrics::MetricsRecorder;
/// use dis_ingest_types::PduKind;
///
/// let recorder = Arc::new(MetricsRecorder::new());
///
/// recorder.record(PduKind::EntityState, 1_000);
/// recorder.record(PduKind::EntityState, 2_000);
///
/// // Both entries are older than 63_000 - 60_000
/// let snapshot = recorder.snapshot(63_000);
/// assert_eq!(snapshot.count(PduKind::EntityState), 0);
/// assert_eq!(snapshot.pdus_in_last_sixty_seconds, 0);
/// ```
#[derive(Debug)]
pub struct MetricsRecorder {
    per_kind: [SlidingWindow; PduKind::COUNT],
    aggregate: SlidingWindow,
    /// Last arrival in epoch ms, or `NO_ARRIVAL`.
    last_received_ms: AtomicU64,
    decode_failures: AtomicU64,
    published: AtomicU64,
    delivered: AtomicU64,
    publish_failures: AtomicU64,
    dropped: AtomicU64,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            per_kind: Default::default(),
            aggregate: SlidingWindow::new(),
            last_received_ms: AtomicU64::new(NO_ARRIVAL),
            decode_failures: AtomicU64::new(0),
            published: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            publish_failures: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Record one PDU of `kind` that arrived at `timestamp_ms`.
    pub fn record(&self, kind: PduKind, timestamp_ms: u64) {
        self.last_received_ms.store(timestamp_ms, Ordering::Relaxed);
        self.per_kind[kind.index()].push(timestamp_ms);
        self.aggregate.push(timestamp_ms);
    }

    /// Record one PDU of `kind` stamped with the current wall-clock time.
    pub fn record_now(&self, kind: PduKind) {
        self.record(kind, current_timestamp_ms());
    }

    /// Prune all windows against `now_ms` and build a fresh snapshot.
    pub fn snapshot(&self, now_ms: u64) -> RealTimeMetrics {
        let mut per_kind = [0u64; PduKind::COUNT];
        for (count, window) in per_kind.iter_mut().zip(self.per_kind.iter()) {
            *count = window.prune_and_count(now_ms);
        }
        let aggregate = self.aggregate.prune_and_count(now_ms);

        let last_received = match self.last_received_ms.load(Ordering::Relaxed) {
            NO_ARRIVAL => now_ms,
            ts => ts,
        };

        RealTimeMetrics::from_counts(last_received, aggregate, &per_kind)
    }

    /// Snapshot against the current wall-clock time.
    pub fn snapshot_now(&self) -> RealTimeMetrics {
        self.snapshot(current_timestamp_ms())
    }

    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_publish_failure(&self) {
        self.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a dropped record and return the running total.
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Current monotonic totals.
    pub fn counters(&self) -> PipelineCounters {
        PipelineCounters {
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
