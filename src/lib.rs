//! # dis-ingest
//!
//! UDP ingestion pipeline for DIS protocol data units.
//!
//! Each datagram received on the ingest port flows through:
//!
//! ```text
//! UdpSocket ──▶ Classifier ──▶ MetricsRecorder ──▶ encoder ──▶ Publisher ──▶ RecordSink
//!  (receiver)   (PduDecoder)   (sliding windows)   (JSON)     (bounded queue)  (Kafka, log)
//! ```
//!
//! - **[`receiver`]**: owns the socket and runs the blocking loop on its own thread
//! - **[`classifier`]**: size check, decoder invocation, and kind tagging
//! - **[`wire`]**: the bundled DIS 7 decoder ([`DisDecoder`])
//! - **[`encoder`]**: JSON records and error records
//! - **[`publisher`]**: non-blocking hand-off to a [`RecordSink`]
//! - **[`config`]**: layered configuration for the binary
//!
//! Metrics live in `dis-ingest-metrics`; sinks in `dis-ingest-sinks`.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use dis_ingest::{Classifier, DisDecoder, Pipeline, Publisher, PublisherConfig};
//! use dis_ingest_metrics::MetricsRecorder;
//! use dis_ingest_sinks::ChannelSink;
//! use dis_ingest_types::PduKind;
//!
//! # tokio_test::block_on(async {
//! let metrics = Arc::new(MetricsRecorder::new());
//! let (sink, mut records) = ChannelSink::create(16);
//! let (publisher, _worker) =
//!     Publisher::spawn(Arc::new(sink), "dis.pdus", PublisherConfig::default(), metrics.clone());
//! let pipeline = Pipeline::new(Classifier::new(DisDecoder::new()), metrics.clone(), publisher);
//!
//! // A header-only PDU with an unprojected type code
//! let mut bytes = [0u8; 12];
//! bytes[0] = 7;
//! bytes[2] = 5;
//! assert_eq!(pipeline.process(&bytes, 1_000).unwrap(), PduKind::Other);
//!
//! let record = records.recv().await.unwrap();
//! assert!(record.payload.contains(r#""type":"Pdu""#));
//! # });
//! ```

pub mod classifier;
pub mod config;
pub mod encoder;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod publisher;
pub mod receiver;
pub mod wire;

pub use classifier::{Classifier, DecodedPdu, PduDecoder, MIN_PDU_SIZE};
pub use config::{ConfigError, IngestConfig, Overrides};
pub use error::{DecodeError, ReceiverError};
pub use pipeline::Pipeline;
pub use publisher::{Publisher, PublisherConfig};
pub use receiver::Receiver;
pub use wire::{DecodeFault, DisDecoder};

// Re-export sink trait for convenience
pub use dis_ingest_sinks::RecordSink;
