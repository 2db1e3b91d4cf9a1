//! In-process sink backed by a tokio mpsc channel.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{RecordSink, SinkError};

/// A record as delivered through a [`ChannelSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkRecord {
    pub destination: String,
    pub payload: String,
}

/// Forwards every record into a channel.
///
/// Useful for embedding the pipeline in another process, and in tests.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<SinkRecord>,
}

impl ChannelSink {
    /// Create a sink and the receiver that observes its records.
    pub fn create(buffer: usize) -> (Self, mpsc::Receiver<SinkRecord>) {
        let (tx, rx) = mpsc::channel(buffer);
        (ChannelSink { tx }, rx)
    }
}

#[async_trait]
impl RecordSink for ChannelSink {
    async fn send(&self, destination: &str, payload: &str) -> Result<(), SinkError> {
        self.tx
            .send(SinkRecord {
                destination: destination.to_string(),
                payload: payload.to_string(),
            })
            .await
            .map_err(|_| SinkError::Closed)
    }

    fn name(&self) -> &'static str {
        "channel"
    }
}
