//! Layered service configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, `DIS_INGEST_*` environment variables (`__` separates sections, e.g.
//! `DIS_INGEST_UDP__PORT=3000`), then command-line overrides.

use std::collections::HashMap;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use dis_ingest_sinks::{LogSink, RecordSink, SinkError};
use serde::Deserialize;
use thiserror::Error;

use crate::classifier::MIN_PDU_SIZE;
use crate::publisher::PublisherConfig;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DIS_INGEST";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UdpConfig {
    pub host: String,
    pub port: u16,
    pub buffer_size: usize,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            buffer_size: 8192,
        }
    }
}

impl UdpConfig {
    /// Resolve `host:port` to a bindable address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| ConfigError::Invalid(format!("udp.host {:?}: {e}", self.host)))?
            .next()
            .ok_or_else(|| ConfigError::Invalid(format!("udp.host {:?} did not resolve", self.host)))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KafkaConfig {
    /// Comma-separated bootstrap servers. Records are only logged when unset.
    pub brokers: Option<String>,
    pub topic: String,
    pub client_id: String,
    pub message_timeout_ms: u64,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: None,
            topic: "dis.pdus".to_string(),
            client_id: "dis-ingest".to_string(),
            message_timeout_ms: 30_000,
        }
    }
}

impl KafkaConfig {
    pub fn message_timeout(&self) -> Duration {
        Duration::from_millis(self.message_timeout_ms)
    }

    /// Build the sink records are published to.
    ///
    /// Without brokers this is a [`LogSink`]. With brokers it is a Kafka
    /// producer, which requires the `kafka` feature.
    pub fn build_sink(&self) -> Result<Arc<dyn RecordSink>, SinkError> {
        let brokers = match self.brokers.as_deref().map(str::trim) {
            Some(b) if !b.is_empty() => b,
            _ => return Ok(Arc::new(LogSink::new())),
        };

        kafka_sink(self, brokers)
    }
}

#[cfg(feature = "kafka")]
fn kafka_sink(config: &KafkaConfig, brokers: &str) -> Result<Arc<dyn RecordSink>, SinkError> {
    let sink = dis_ingest_sinks::kafka::KafkaSink::builder()
        .brokers(brokers)
        .client_id(config.client_id.as_str())
        .message_timeout(config.message_timeout())
        .build()?;
    Ok(Arc::new(sink))
}

#[cfg(not(feature = "kafka"))]
fn kafka_sink(_config: &KafkaConfig, brokers: &str) -> Result<Arc<dyn RecordSink>, SinkError> {
    Err(SinkError::Config(format!(
        "kafka.brokers is set to {brokers:?} but this build lacks the `kafka` feature"
    )))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub enabled: bool,
    pub listen_addr: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Command-line values that take precedence over every other source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub topic: Option<String>,
    pub brokers: Option<String>,
    pub http_addr: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub udp: UdpConfig,
    pub kafka: KafkaConfig,
    pub publisher: PublisherConfig,
    pub http: HttpConfig,
}

impl IngestConfig {
    /// Load from an optional file and the process environment, then apply
    /// overrides and validate.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::load_from(path, None, overrides)
    }

    /// Like [`IngestConfig::load`], reading environment variables from `env`
    /// instead of the process when given.
    pub fn load_from(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
        overrides: &Overrides,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let mut config: IngestConfig = builder.build()?.try_deserialize()?;
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(port) = overrides.port {
            self.udp.port = port;
        }
        if let Some(topic) = &overrides.topic {
            self.kafka.topic = topic.clone();
        }
        if let Some(brokers) = &overrides.brokers {
            self.kafka.brokers = Some(brokers.clone());
        }
        if let Some(addr) = &overrides.http_addr {
            self.http.listen_addr = addr.clone();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.udp.port == 0 {
            return Err(ConfigError::Invalid("udp.port must be non-zero".into()));
        }
        if self.udp.buffer_size < MIN_PDU_SIZE {
            return Err(ConfigError::Invalid(format!(
                "udp.buffer_size must be at least {MIN_PDU_SIZE}, got {}",
                self.udp.buffer_size
            )));
        }
        if self.publisher.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "publisher.queue_capacity must be greater than zero".into(),
            ));
        }
        if self.publisher.max_in_flight == 0 {
            return Err(ConfigError::Invalid(
                "publisher.max_in_flight must be greater than zero".into(),
            ));
        }
        if self.kafka.topic.trim().is_empty() {
            return Err(ConfigError::Invalid("kafka.topic must not be empty".into()));
        }
        Ok(())
    }
}
