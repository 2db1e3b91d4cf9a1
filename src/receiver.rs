//! Blocking UDP receive loop.
//!
//! The loop owns the socket and runs on its own OS thread so a slow sink or
//! a busy runtime can never delay `recv_from`.

use std::convert::Infallible;
use std::io::{self, ErrorKind};
use std::net::{SocketAddr, UdpSocket};
use std::thread;

use dis_ingest_types::current_timestamp_ms;
use tokio::sync::oneshot;
use tracing::{error, info, trace, warn};

use crate::classifier::PduDecoder;
use crate::error::ReceiverError;
use crate::pipeline::Pipeline;

/// Name of the receive loop thread.
pub const THREAD_NAME: &str = "pdu-receiver";

/// UDP socket bound to the ingest port, plus the pipeline fed by it.
#[derive(Debug)]
pub struct Receiver<D> {
    socket: UdpSocket,
    buffer_size: usize,
    pipeline: Pipeline<D>,
}

impl<D: PduDecoder + 'static> Receiver<D> {
    /// Bind the socket. A bind failure is fatal to the service.
    pub fn bind(
        addr: SocketAddr,
        buffer_size: usize,
        pipeline: Pipeline<D>,
    ) -> Result<Self, ReceiverError> {
        let socket = UdpSocket::bind(addr).map_err(|source| ReceiverError::Bind { addr, source })?;
        Ok(Self {
            socket,
            buffer_size,
            pipeline,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receive datagrams until the socket fails.
    ///
    /// Only returns on a non-transient socket error.
    pub fn run(self) -> Result<Infallible, ReceiverError> {
        let mut buffer = vec![0u8; self.buffer_size];
        info!(
            addr = ?self.socket.local_addr().ok(),
            buffer_size = self.buffer_size,
            "receive loop started"
        );

        loop {
            let (len, peer) = match self.socket.recv_from(&mut buffer) {
                Ok(received) => received,
                Err(e) if is_transient(&e) => {
                    warn!(error = %e, "transient UDP receive error");
                    continue;
                }
                Err(e) => {
                    error!(error = %e, "UDP socket failed");
                    return Err(ReceiverError::Socket(e));
                }
            };

            let arrival_ms = current_timestamp_ms();
            trace!(%peer, len, "datagram received");
            // Failures are logged and counted by the pipeline.
            let _ = self.pipeline.process(&buffer[..len], arrival_ms);
        }
    }

    /// Run the loop on a dedicated thread.
    ///
    /// The returned channel yields the fatal error if the loop ever stops.
    pub fn spawn(self) -> io::Result<oneshot::Receiver<ReceiverError>> {
        let (tx, rx) = oneshot::channel();
        thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || match self.run() {
                Ok(never) => match never {},
                Err(err) => {
                    let _ = tx.send(err);
                }
            })?;
        Ok(rx)
    }
}

/// Receive errors that leave the socket usable.
pub fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::Interrupted
            | ErrorKind::WouldBlock
            | ErrorKind::TimedOut
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionRefused
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::publisher::{Publisher, PublisherConfig};
    use crate::wire::tests::{datagram, put_entity_id, put_location};
    use crate::wire::DisDecoder;
    use dis_ingest_metrics::MetricsRecorder;
    use dis_ingest_sinks::ChannelSink;
    use dis_ingest_types::{EntityId, PduKind, Vector3};
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;

    fn pipeline(
        metrics: Arc<MetricsRecorder>,
    ) -> (
        Pipeline<DisDecoder>,
        tokio::sync::mpsc::Receiver<dis_ingest_sinks::SinkRecord>,
    ) {
        let (sink, rx) = ChannelSink::create(64);
        let (publisher, _handle) = Publisher::spawn(
            Arc::new(sink),
            "dis.pdus",
            PublisherConfig::default(),
            metrics.clone(),
        );
        (
            Pipeline::new(Classifier::new(DisDecoder::new()), metrics, publisher),
            rx,
        )
    }

    #[test]
    fn transient_kinds() {
        for kind in [
            ErrorKind::Interrupted,
            ErrorKind::WouldBlock,
            ErrorKind::TimedOut,
            ErrorKind::ConnectionReset,
            ErrorKind::ConnectionRefused,
        ] {
            assert!(is_transient(&io::Error::from(kind)), "{kind:?}");
        }
        for kind in [
            ErrorKind::PermissionDenied,
            ErrorKind::InvalidInput,
            ErrorKind::Other,
        ] {
            assert!(!is_transient(&io::Error::from(kind)), "{kind:?}");
        }
    }

    #[tokio::test]
    async fn bind_conflict_is_a_bind_error() {
        let taken = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();

        let (pipeline, _rx) = pipeline(Arc::new(MetricsRecorder::new()));
        let err = Receiver::bind(addr, 8192, pipeline).unwrap_err();
        match err {
            ReceiverError::Bind { addr: failed, .. } => assert_eq!(failed, addr),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn receives_datagrams_end_to_end() {
        let metrics = Arc::new(MetricsRecorder::new());
        let (pipeline, mut rx) = pipeline(metrics.clone());
        let receiver =
            Receiver::bind("127.0.0.1:0".parse().unwrap(), 8192, pipeline).unwrap();
        let addr = receiver.local_addr().unwrap();
        let _fatal = receiver.spawn().unwrap();

        let mut entity_state = datagram(1, 100, 144);
        put_entity_id(&mut entity_state, 12, EntityId::new(18, 23, 1001));
        put_location(&mut entity_state, 48, Vector3::new(1.0, 2.0, 3.0));

        let client = UdpSocket::bind("127.0.0.1:0").unwrap();
        client.send_to(&entity_state, addr).unwrap();
        client.send_to(&[0u8; 10], addr).unwrap();
        client.send_to(&datagram(1, 0, 20), addr).unwrap();

        let mut records = Vec::new();
        for _ in 0..3 {
            let record = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .unwrap()
                .unwrap();
            records.push(serde_json::from_str::<Value>(&record.payload).unwrap());
        }

        let ok = records
            .iter()
            .find(|r| r["type"] == "EntityStatePdu")
            .unwrap();
        assert_eq!(ok["entityId"]["entity"], 1001);
        assert_eq!(ok["location"]["z"], 3.0);
        assert_eq!(ok["timestamp"], 100);

        assert!(records
            .iter()
            .any(|r| r["error"] == "PDU data too small to be valid" && r["length"] == 10));
        assert!(records.iter().any(|r| r["error"]
            .as_str()
            .is_some_and(|e| e.starts_with("Error decoding PDU:"))
            && r["length"] == 20));

        let snapshot = metrics.snapshot_now();
        assert_eq!(snapshot.count(PduKind::EntityState), 1);
        assert_eq!(snapshot.pdus_in_last_sixty_seconds, 1);
        assert_eq!(metrics.counters().decode_failures, 2);
    }
}
