//! Per-datagram processing: classify, record, encode, publish.

use std::sync::Arc;

use dis_ingest_metrics::MetricsRecorder;
use dis_ingest_types::{current_timestamp_ms, PduKind};
use tracing::{trace, warn};

use crate::classifier::{Classifier, PduDecoder};
use crate::encoder::{encode, encode_error};
use crate::error::DecodeError;
use crate::publisher::Publisher;

/// Everything the receive loop does with one datagram, minus the socket.
#[derive(Debug)]
pub struct Pipeline<D> {
    classifier: Classifier<D>,
    metrics: Arc<MetricsRecorder>,
    publisher: Publisher,
}

impl<D: PduDecoder> Pipeline<D> {
    pub fn new(classifier: Classifier<D>, metrics: Arc<MetricsRecorder>, publisher: Publisher) -> Self {
        Self {
            classifier,
            metrics,
            publisher,
        }
    }

    /// Process one datagram that arrived at `arrival_ms`.
    ///
    /// Records the kind, then publishes the encoded record. A datagram that
    /// fails classification is counted as a decode failure and published as
    /// an error record; it never touches the windows.
    pub fn process(&self, bytes: &[u8], arrival_ms: u64) -> Result<PduKind, DecodeError> {
        match self.classifier.classify(bytes) {
            Ok(pdu) => {
                let kind = pdu.kind();
                self.metrics.record(kind, arrival_ms);
                let record = encode(&pdu, bytes.len(), current_timestamp_ms());
                trace!(kind = kind.label(), length = bytes.len(), "pdu processed");
                self.publisher.publish(record);
                Ok(kind)
            }
            Err(err) => {
                warn!(length = err.length(), error = %err, "failed to classify datagram");
                self.metrics.record_decode_failure();
                self.publisher.publish(encode_error(&err));
                Err(err)
            }
        }
    }
}
