//! HTTP read surface for health and real-time metrics.
//!
//! Serves three views of a shared [`MetricsRecorder`]:
//!
//! - `GET /internal/metrics/realtime`: the JSON snapshot
//! - `GET /api/ingestion/health` (also `/health`, `/healthz`): liveness and counters
//! - `GET /metrics`: Prometheus text exposition format
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dis_ingest_metrics::{MetricsRecorder, MetricsServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let recorder = Arc::new(MetricsRecorder::new());
//!     let config = ServerConfig::builder().listen_addr("0.0.0.0:8080").build();
//!
//!     let (addr, handle) = MetricsServer::new(config, recorder).start().await?;
//!     println!("serving metrics on {addr}");
//!     let _ = handle.await;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use dis_ingest_types::{PduKind, PipelineCounters, RealTimeMetrics};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::MetricsRecorder;

/// Configuration for the metrics HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Path for the JSON snapshot
    pub realtime_path: String,
    /// Path for Prometheus exposition
    pub metrics_path: String,
    /// Optional namespace prefix for Prometheus metric names
    pub namespace: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            realtime_path: "/internal/metrics/realtime".to_string(),
            metrics_path: "/metrics".to_string(),
            namespace: None,
        }
    }
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

/// Builder for ServerConfig.
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    listen_addr: Option<String>,
    realtime_path: Option<String>,
    metrics_path: Option<String>,
    namespace: Option<String>,
}

impl ServerConfigBuilder {
    /// Set the listen address (default: `0.0.0.0:8080`).
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = Some(addr.into());
        self
    }

    /// Set the path of the JSON real-time metrics endpoint.
    pub fn realtime_path(mut self, path: impl Into<String>) -> Self {
        self.realtime_path = Some(path.into());
        self
    }

    /// Set the Prometheus metrics path.
    pub fn metrics_path(mut self, path: impl Into<String>) -> Self {
        self.metrics_path = Some(path.into());
        self
    }

    /// Set the namespace prefix for all metrics.
    pub fn namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = Some(ns.into());
        self
    }

    /// Build the config, filling unset fields from [`ServerConfig::default`].
    pub fn build(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            listen_addr: self.listen_addr.unwrap_or(defaults.listen_addr),
            realtime_path: self.realtime_path.unwrap_or(defaults.realtime_path),
            metrics_path: self.metrics_path.unwrap_or(defaults.metrics_path),
            namespace: self.namespace,
        }
    }
}

/// HTTP server exposing a [`MetricsRecorder`].
#[derive(Debug, Clone)]
pub struct MetricsServer {
    config: Arc<ServerConfig>,
    recorder: Arc<MetricsRecorder>,
}

impl MetricsServer {
    pub fn new(config: ServerConfig, recorder: Arc<MetricsRecorder>) -> Self {
        Self {
            config: Arc::new(config),
            recorder,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind the listener and spawn the accept loop.
    ///
    /// Binding happens before this returns, so an unusable address is
    /// reported to the caller rather than logged from a background task.
    /// Returns the bound address and the accept loop's handle.
    pub async fn start(self) -> std::io::Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
        let addr: SocketAddr = self
            .config
            .listen_addr
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "metrics server listening");

        let handle = tokio::spawn(async move { self.accept_loop(listener).await });
        Ok((local_addr, handle))
    }

    async fn accept_loop(self, listener: TcpListener) {
        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "metrics server accept failed");
                    continue;
                }
            };
            let io = TokioIo::new(stream);
            let server = self.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let server = server.clone();
                    async move { Ok::<_, Infallible>(server.handle(req.method(), req.uri().path())) }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!(%peer, error = %e, "metrics connection error");
                }
            });
        }
    }

    /// Route a request to its handler.
    pub fn handle(&self, method: &Method, path: &str) -> Response<Full<Bytes>> {
        if method != Method::GET {
            return text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        }

        if path == self.config.realtime_path {
            let snapshot = self.recorder.snapshot_now();
            match serde_json::to_string(&snapshot) {
                Ok(body) => json_response(body),
                Err(e) => text_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
            }
        } else if path == self.config.metrics_path {
            let snapshot = self.recorder.snapshot_now();
            let body = format_prometheus(
                &snapshot,
                &self.recorder.counters(),
                self.config.namespace.as_deref(),
            );
            let mut response = Response::new(Full::new(Bytes::from(body)));
            response.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
            );
            response
        } else if path == "/api/ingestion/health" || path == "/health" || path == "/healthz" {
            let body = serde_json::json!({
                "status": "UP",
                "message": "Data ingestion service is running",
                "counters": self.recorder.counters(),
            });
            json_response(body.to_string())
        } else {
            text_response(StatusCode::NOT_FOUND, "Not Found")
        }
    }
}

fn json_response(body: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn text_response(status: StatusCode, body: &str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

/// Format a snapshot and counters in the Prometheus exposition format.
pub fn format_prometheus(
    snapshot: &RealTimeMetrics,
    counters: &PipelineCounters,
    namespace: Option<&str>,
) -> String {
    let mut output = String::new();
    let prefix = namespace.map(|n| format!("{}_", n)).unwrap_or_default();

    output.push_str(&format!(
        "# HELP {}dis_pdus_window PDUs received in the last sixty seconds\n",
        prefix
    ));
    output.push_str(&format!("# TYPE {}dis_pdus_window gauge\n", prefix));
    for kind in PduKind::ALL {
        output.push_str(&format!(
            "{}dis_pdus_window{{kind=\"{}\"}} {}\n",
            prefix,
            kind.label(),
            snapshot.count(kind)
        ));
    }
    output.push_str(&format!(
        "{}dis_pdus_window{{kind=\"all\"}} {}\n",
        prefix, snapshot.pdus_in_last_sixty_seconds
    ));

    output.push_str(&format!(
        "# HELP {}dis_pdu_rate_per_second Average PDU rate over the last sixty seconds\n",
        prefix
    ));
    output.push_str(&format!("# TYPE {}dis_pdu_rate_per_second gauge\n", prefix));
    output.push_str(&format!(
        "{}dis_pdu_rate_per_second {}\n",
        prefix, snapshot.average_pdu_rate_per_second_last_sixty_seconds
    ));

    output.push_str(&format!(
        "# HELP {}dis_last_pdu_received_timestamp_ms Arrival time of the most recent PDU\n",
        prefix
    ));
    output.push_str(&format!(
        "# TYPE {}dis_last_pdu_received_timestamp_ms gauge\n",
        prefix
    ));
    output.push_str(&format!(
        "{}dis_last_pdu_received_timestamp_ms {}\n",
        prefix, snapshot.last_pdu_received_timestamp_ms
    ));

    for (name, help, value) in [
        (
            "dis_decode_failures_total",
            "Datagrams that failed classification",
            counters.decode_failures,
        ),
        (
            "dis_records_published_total",
            "Records accepted by the publisher queue",
            counters.published,
        ),
        (
            "dis_records_delivered_total",
            "Records acknowledged by the sink",
            counters.delivered,
        ),
        (
            "dis_publish_failures_total",
            "Records the sink failed to accept",
            counters.publish_failures,
        ),
        (
            "dis_records_dropped_total",
            "Records dropped because the publisher queue was full",
            counters.dropped,
        ),
    ] {
        output.push_str(&format!("# HELP {}{} {}\n", prefix, name, help));
        output.push_str(&format!("# TYPE {}{} counter\n", prefix, name));
        output.push_str(&format!("{}{} {}\n", prefix, name, value));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn server_with(recorder: Arc<MetricsRecorder>) -> MetricsServer {
        MetricsServer::new(ServerConfig::default(), recorder)
    }

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn builder_defaults() {
        let config = ServerConfig::builder().build();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.realtime_path, "/internal/metrics/realtime");
        assert_eq!(config.metrics_path, "/metrics");
        assert!(config.namespace.is_none());
    }

    #[test]
    fn builder_chains_all_options() {
        let config = ServerConfig::builder()
            .listen_addr("127.0.0.1:9999")
            .realtime_path("/rt")
            .metrics_path("/prom")
            .namespace("ingest")
            .build();

        assert_eq!(config.listen_addr, "127.0.0.1:9999");
        assert_eq!(config.realtime_path, "/rt");
        assert_eq!(config.metrics_path, "/prom");
        assert_eq!(config.namespace.as_deref(), Some("ingest"));
    }

    #[tokio::test]
    async fn realtime_returns_snapshot_json() {
        let recorder = Arc::new(MetricsRecorder::new());
        recorder.record_now(PduKind::Fire);
        recorder.record_now(PduKind::EntityState);

        let response = server_with(recorder).handle(&Method::GET, "/internal/metrics/realtime");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let value: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(value["pdusInLastSixtySeconds"], 2);
        assert_eq!(value["fireEventPdusInLastSixtySeconds"], 1);
        assert_eq!(value["entityStatePdusInLastSixtySeconds"], 1);
        assert!(value["lastPduReceivedTimestampMs"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn health_reports_up_with_counters() {
        let recorder = Arc::new(MetricsRecorder::new());
        recorder.record_decode_failure();

        let server = server_with(recorder);
        for path in ["/api/ingestion/health", "/health", "/healthz"] {
            let response = server.handle(&Method::GET, path);
            assert_eq!(response.status(), StatusCode::OK);

            let value: serde_json::Value =
                serde_json::from_str(&body_string(response).await).unwrap();
            assert_eq!(value["status"], "UP");
            assert_eq!(value["message"], "Data ingestion service is running");
            assert_eq!(value["counters"]["decodeFailures"], 1);
        }
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let server = server_with(Arc::new(MetricsRecorder::new()));
        let response = server.handle(&Method::GET, "/nope");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_get_is_rejected() {
        let server = server_with(Arc::new(MetricsRecorder::new()));
        let response = server.handle(&Method::POST, "/internal/metrics/realtime");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn prometheus_endpoint_renders_text() {
        let recorder = Arc::new(MetricsRecorder::new());
        recorder.record_now(PduKind::Designator);

        let response = server_with(recorder).handle(&Method::GET, "/metrics");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("dis_pdus_window{kind=\"designator\"} 1"));
        assert!(body.contains("dis_pdus_window{kind=\"all\"} 1"));
    }

    #[test]
    fn format_prometheus_applies_namespace() {
        let snapshot = RealTimeMetrics::from_counts(1, 0, &[0; PduKind::COUNT]);
        let counters = PipelineCounters {
            dropped: 3,
            ..Default::default()
        };
        let output = format_prometheus(&snapshot, &counters, Some("ingest"));

        assert!(output.contains("# TYPE ingest_dis_pdus_window gauge"));
        assert!(output.contains("ingest_dis_records_dropped_total 3"));
        assert!(output.contains("ingest_dis_last_pdu_received_timestamp_ms 1"));
    }

    #[test]
    fn format_prometheus_lists_every_kind() {
        let snapshot = RealTimeMetrics::from_counts(1, 0, &[0; PduKind::COUNT]);
        let output = format_prometheus(&snapshot, &PipelineCounters::default(), None);
        for kind in PduKind::ALL {
            assert!(output.contains(&format!("kind=\"{}\"", kind.label())));
        }
    }

    #[tokio::test]
    async fn serves_over_tcp() {
        let recorder = Arc::new(MetricsRecorder::new());
        recorder.record_now(PduKind::Collision);
        let config = ServerConfig::builder().listen_addr("127.0.0.1:0").build();

        let (addr, handle) = MetricsServer::new(config, recorder).start().await.unwrap();

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(
                b"GET /internal/metrics/realtime HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            )
            .await
            .unwrap();
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        let raw = String::from_utf8(raw).unwrap();

        assert!(raw.starts_with("HTTP/1.1 200 OK"));
        let body = raw.split("\r\n\r\n").nth(1).unwrap();
        let value: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(value["collisionPdusInLastSixtySeconds"], 1);

        handle.abort();
    }

    #[tokio::test]
    async fn start_fails_on_invalid_address() {
        let config = ServerConfig::builder().listen_addr("not-an-address").build();
        let result = MetricsServer::new(config, Arc::new(MetricsRecorder::new()))
            .start()
            .await;
        assert!(result.is_err());
    }
}
