//! # dis-ingest-metrics
//!
//! Real-time PDU metrics for the DIS ingestion pipeline.
//!
//! A single [`MetricsRecorder`] owns one sliding window per PDU kind plus an
//! aggregate window. The receive loop is the only writer; any number of
//! readers may call [`MetricsRecorder::snapshot`] at the same time.
//!
//! ## Quick Start
//!
//! ```rust
//! use dis_ingest_metrics::MetricsRecorder;
//! use dis_ingest_types::PduKind;
//!
//! let recorder = MetricsRecorder::new();
//!
//! recorder.record(PduKind::Fire, 0);
//!
//! let snapshot = recorder.snapshot(30_000);
//! assert_eq!(snapshot.count(PduKind::Fire), 1);
//! assert_eq!(snapshot.pdus_in_last_sixty_seconds, 1);
//! ```
//!
//! ## Features
//!
//! - `http` (default): a hyper server exposing health, the JSON snapshot,
//!   and a Prometheus text rendering.

mod recorder;
mod window;

#[cfg(feature = "http")]
pub mod server;

pub use recorder::MetricsRecorder;
pub use window::SlidingWindow;

#[cfg(feature = "http")]
pub use server::{MetricsServer, ServerConfig};

// Re-export types for convenience
pub use dis_ingest_types::{PduKind, PipelineCounters, RealTimeMetrics, WINDOW_MS};
