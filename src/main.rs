use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use dis_ingest::config::{IngestConfig, Overrides};
use dis_ingest::logging::init_logging;
use dis_ingest::{Classifier, DisDecoder, Pipeline, Publisher, Receiver};
use dis_ingest_metrics::{MetricsRecorder, MetricsServer, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "dis-ingest")]
#[command(about = "Ingest DIS PDUs over UDP, track real-time metrics, and publish JSON records")]
#[command(version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// UDP port to receive PDUs on
    #[arg(short, long)]
    port: Option<u16>,

    /// Topic records are published to
    #[arg(short, long)]
    topic: Option<String>,

    /// Kafka bootstrap servers (comma-separated); records are only logged when unset
    #[arg(short, long)]
    brokers: Option<String>,

    /// Address for the health and metrics HTTP server (host:port)
    #[arg(long)]
    http_addr: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            port: self.port,
            topic: self.topic.clone(),
            brokers: self.brokers.clone(),
            http_addr: self.http_addr.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(err) = run(args).await {
        error!("{:#}", err);
        return Err(err);
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let config = IngestConfig::load(args.config.as_deref(), &args.overrides())
        .context("failed to load configuration")?;

    let metrics = Arc::new(MetricsRecorder::new());

    let sink = config
        .kafka
        .build_sink()
        .context("failed to create record sink")?;
    info!(sink = sink.name(), topic = %config.kafka.topic, "publishing records");
    let (publisher, _worker) = Publisher::spawn(
        sink,
        config.kafka.topic.clone(),
        config.publisher,
        metrics.clone(),
    );

    if config.http.enabled {
        let server_config = ServerConfig::builder()
            .listen_addr(config.http.listen_addr.clone())
            .build();
        let (addr, _server) = MetricsServer::new(server_config, metrics.clone())
            .start()
            .await
            .with_context(|| format!("failed to start HTTP server on {}", config.http.listen_addr))?;
        info!(%addr, "health and metrics available");
    }

    let pipeline = Pipeline::new(Classifier::new(DisDecoder::new()), metrics, publisher);
    let receiver = Receiver::bind(config.udp.socket_addr()?, config.udp.buffer_size, pipeline)?;
    info!(addr = %receiver.local_addr()?, "listening for PDUs");

    let fatal = receiver
        .spawn()
        .context("failed to start receiver thread")?;

    tokio::select! {
        result = fatal => match result {
            Ok(err) => Err(err.into()),
            Err(_) => Err(anyhow::anyhow!("receiver thread exited unexpectedly")),
        },
        _ = shutdown_signal() => {
            info!("shutting down");
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
