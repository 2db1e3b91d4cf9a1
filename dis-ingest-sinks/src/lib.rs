//! # dis-ingest-sinks
//!
//! Destinations for encoded DIS records.
//!
//! Every sink implements [`RecordSink`]: an async `send` of one JSON payload
//! to a named destination (a Kafka topic for [`kafka::KafkaSink`]).
//!
//! ## Available Sinks
//!
//! - **Kafka** (`kafka` feature) - Produces each record to a topic via rdkafka
//! - **Channel** - Forwards records into a tokio mpsc channel
//! - **Log** - Emits each record as a `tracing` event
//!
//! ## Quick Start
//!
//! ```rust
//! use dis_ingest_sinks::{ChannelSink, RecordSink};
//!
//! # tokio_test::block_on(async {
//! let (sink, mut rx) = ChannelSink::create(16);
//!
//! sink.send("dis.pdus", r#"{"type":"FirePdu"}"#).await.unwrap();
//!
//! let record = rx.recv().await.unwrap();
//! assert_eq!(record.destination, "dis.pdus");
//! # });
//! ```

use async_trait::async_trait;

pub mod channel;
pub mod error;
pub mod log;

#[cfg(feature = "kafka")]
pub mod kafka;

pub use channel::{ChannelSink, SinkRecord};
pub use error::SinkError;
pub use log::LogSink;

/// A destination for encoded records.
///
/// Implementations must be shareable across tasks; the publisher holds one
/// behind an `Arc` and calls `send` from many concurrent tasks.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Deliver one payload to `destination`.
    async fn send(&self, destination: &str, payload: &str) -> Result<(), SinkError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
