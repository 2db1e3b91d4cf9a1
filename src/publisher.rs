//! Non-blocking hand-off of encoded records to a [`RecordSink`].
//!
//! The receive loop calls [`Publisher::publish`], which never waits: records
//! go into a bounded queue and a worker task drains it, sending up to
//! `max_in_flight` records concurrently. When the queue is full the newest
//! record is dropped and counted. Only the first drop of a run is logged at
//! warn; the rest go to debug until a record is accepted again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dis_ingest_metrics::MetricsRecorder;
use dis_ingest_sinks::RecordSink;
use serde::Deserialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Records that may wait for the worker.
    pub queue_capacity: usize,
    /// Concurrent sends to the sink.
    pub max_in_flight: usize,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            max_in_flight: 64,
        }
    }
}

/// Sending half of the publish queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Publisher {
    tx: mpsc::Sender<String>,
    metrics: Arc<MetricsRecorder>,
    /// Set while records are being dropped.
    dropping: Arc<AtomicBool>,
}

impl Publisher {
    /// Start the worker on the current tokio runtime.
    ///
    /// The worker runs until every `Publisher` clone is dropped, then waits
    /// for in-flight sends before the returned handle completes.
    pub fn spawn(
        sink: Arc<dyn RecordSink>,
        topic: impl Into<String>,
        config: PublisherConfig,
        metrics: Arc<MetricsRecorder>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let worker = Worker {
            sink,
            topic: Arc::from(topic.into()),
            max_in_flight: config.max_in_flight.max(1),
            metrics: metrics.clone(),
        };
        let handle = tokio::spawn(worker.run(rx));
        let publisher = Self {
            tx,
            metrics,
            dropping: Arc::new(AtomicBool::new(false)),
        };
        (publisher, handle)
    }

    /// Queue a record without blocking. Returns `false` if it was dropped.
    pub fn publish(&self, record: String) -> bool {
        match self.tx.try_send(record) {
            Ok(()) => {
                self.metrics.record_published();
                if self.dropping.load(Ordering::Relaxed) {
                    self.dropping.store(false, Ordering::Relaxed);
                }
                true
            }
            Err(TrySendError::Full(_)) => {
                self.drop_record("publish queue full");
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.drop_record("publisher worker stopped");
                false
            }
        }
    }

    fn drop_record(&self, reason: &'static str) {
        let dropped = self.metrics.record_dropped();
        if self.dropping.swap(true, Ordering::Relaxed) {
            debug!(reason, dropped, "dropping record");
        } else {
            warn!(reason, dropped, "dropping records until the publisher catches up");
        }
    }
}

struct Worker {
    sink: Arc<dyn RecordSink>,
    topic: Arc<str>,
    max_in_flight: usize,
    metrics: Arc<MetricsRecorder>,
}

impl Worker {
    async fn run(self, mut rx: mpsc::Receiver<String>) {
        let permits = Arc::new(Semaphore::new(self.max_in_flight));

        while let Some(record) = rx.recv().await {
            let permit = match Arc::clone(&permits).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let sink = Arc::clone(&self.sink);
            let topic = Arc::clone(&self.topic);
            let metrics = Arc::clone(&self.metrics);

            tokio::spawn(async move {
                let _permit = permit;
                match sink.send(&topic, &record).await {
                    Ok(()) => metrics.record_delivered(),
                    Err(err) => {
                        metrics.record_publish_failure();
                        error!(sink = sink.name(), %topic, error = %err, "failed to publish record");
                    }
                }
            });
        }

        // Every permit back means every send finished.
        let all = u32::try_from(self.max_in_flight).unwrap_or(u32::MAX);
        let _ = permits.acquire_many(all).await;
        debug!(sink = self.sink.name(), "publisher worker stopped");
    }
}
