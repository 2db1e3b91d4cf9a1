//! Error types for sinks.

use thiserror::Error;

/// Errors that can occur when delivering a record.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Sink could not be constructed from its configuration.
    #[error("Invalid sink configuration: {0}")]
    Config(String),

    /// The broker rejected or failed to acknowledge the record.
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// The receiving side of the sink is gone.
    #[error("Sink closed")]
    Closed,

    /// Timeout waiting for acknowledgement.
    #[error("Delivery timed out")]
    Timeout,
}

#[cfg(feature = "kafka")]
impl From<rdkafka::error::KafkaError> for SinkError {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        use rdkafka::error::{KafkaError, RDKafkaErrorCode};
        match err {
            KafkaError::MessageProduction(RDKafkaErrorCode::MessageTimedOut) => SinkError::Timeout,
            KafkaError::ClientCreation(msg) => SinkError::Config(msg),
            other => SinkError::Delivery(other.to_string()),
        }
    }
}
