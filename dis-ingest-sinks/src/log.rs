//! Sink that only logs records.
//!
//! Used when no broker is configured so the pipeline still runs end to end.

use async_trait::async_trait;
use tracing::info;

use crate::{RecordSink, SinkError};

#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        LogSink
    }
}

#[async_trait]
impl RecordSink for LogSink {
    async fn send(&self, destination: &str, payload: &str) -> Result<(), SinkError> {
        info!(target: "dis_ingest::records", destination, payload, "record");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
