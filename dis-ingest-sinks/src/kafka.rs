//! Kafka sink producing each record to a topic.
//!
//! Uses an rdkafka `FutureProducer` (librdkafka bindings). Records are sent
//! without a key, so partition assignment is left to the producer.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dis_ingest_sinks::kafka::KafkaSink;
//! use dis_ingest_sinks::RecordSink;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sink = KafkaSink::builder()
//!         .brokers("localhost:9092")
//!         .client_id("dis-ingest")
//!         .build()?;
//!
//!     sink.send("dis.pdus", r#"{"type":"EntityStatePdu"}"#).await?;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use tracing::debug;

use crate::{RecordSink, SinkError};

/// Kafka-backed [`RecordSink`].
pub struct KafkaSink {
    producer: FutureProducer,
    queue_timeout: Duration,
}

impl KafkaSink {
    /// Create a new builder for configuring the sink.
    pub fn builder() -> KafkaSinkBuilder {
        KafkaSinkBuilder::default()
    }
}

impl std::fmt::Debug for KafkaSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaSink")
            .field("queue_timeout", &self.queue_timeout)
            .finish()
    }
}

#[async_trait]
impl RecordSink for KafkaSink {
    async fn send(&self, destination: &str, payload: &str) -> Result<(), SinkError> {
        let record = FutureRecord::<(), str>::to(destination).payload(payload);
        match self
            .producer
            .send(record, Timeout::After(self.queue_timeout))
            .await
        {
            Ok(_) => {
                debug!(destination, "record delivered");
                Ok(())
            }
            Err((err, _message)) => Err(err.into()),
        }
    }

    fn name(&self) -> &'static str {
        "kafka"
    }
}

/// Builder for KafkaSink.
#[derive(Debug, Default)]
pub struct KafkaSinkBuilder {
    brokers: Option<String>,
    client_id: Option<String>,
    message_timeout: Option<Duration>,
    queue_timeout: Option<Duration>,
}

impl KafkaSinkBuilder {
    /// Set the Kafka broker addresses (comma-separated).
    pub fn brokers(mut self, brokers: impl Into<String>) -> Self {
        self.brokers = Some(brokers.into());
        self
    }

    /// Set the client id reported to the brokers.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set how long librdkafka may try to deliver a record (default: 30 seconds).
    pub fn message_timeout(mut self, timeout: Duration) -> Self {
        self.message_timeout = Some(timeout);
        self
    }

    /// Set how long `send` waits for space in the producer queue (default: 0).
    pub fn queue_timeout(mut self, timeout: Duration) -> Self {
        self.queue_timeout = Some(timeout);
        self
    }

    /// Build the sink.
    pub fn build(self) -> Result<KafkaSink, SinkError> {
        let brokers = self
            .brokers
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| SinkError::Config("no brokers configured".to_string()))?;
        let client_id = self.client_id.unwrap_or_else(|| "dis-ingest".to_string());
        let message_timeout = self.message_timeout.unwrap_or(Duration::from_secs(30));

        let mut config = ClientConfig::new();
        config.set("bootstrap.servers", &brokers);
        config.set("client.id", &client_id);
        config.set(
            "message.timeout.ms",
            message_timeout.as_millis().to_string(),
        );

        let producer: FutureProducer = config
            .create()
            .map_err(|e| SinkError::Config(e.to_string()))?;

        Ok(KafkaSink {
            producer,
            queue_timeout: self.queue_timeout.unwrap_or(Duration::ZERO),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_stores_brokers() {
        let builder = KafkaSink::builder().brokers("broker1:9092,broker2:9092");
        assert_eq!(builder.brokers.unwrap(), "broker1:9092,broker2:9092");
    }

    #[test]
    fn builder_chains_all_options() {
        let builder = KafkaSink::builder()
            .brokers("localhost:9092")
            .client_id("ingest-test")
            .message_timeout(Duration::from_secs(5))
            .queue_timeout(Duration::from_millis(10));

        assert_eq!(builder.brokers.unwrap(), "localhost:9092");
        assert_eq!(builder.client_id.unwrap(), "ingest-test");
        assert_eq!(builder.message_timeout.unwrap(), Duration::from_secs(5));
        assert_eq!(builder.queue_timeout.unwrap(), Duration::from_millis(10));
    }

    #[test]
    fn builder_default_is_empty() {
        let builder = KafkaSinkBuilder::default();
        assert!(builder.brokers.is_none());
        assert!(builder.client_id.is_none());
        assert!(builder.message_timeout.is_none());
        assert!(builder.queue_timeout.is_none());
    }

    #[test]
    fn build_without_brokers_is_a_config_error() {
        let err = KafkaSink::builder().build().unwrap_err();
        assert!(matches!(err, SinkError::Config(_)));

        let err = KafkaSink::builder().brokers("  ").build().unwrap_err();
        assert!(matches!(err, SinkError::Config(_)));
    }

    #[test]
    fn build_with_brokers_creates_producer() {
        // Producer creation does not contact the brokers.
        let sink = KafkaSink::builder()
            .brokers("localhost:9092")
            .build()
            .unwrap();
        assert_eq!(sink.name(), "kafka");
    }
}
