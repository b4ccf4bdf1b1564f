//! history-gateway binary.

use anyhow::{Context, Result};
use clap::Parser;
use history_gateway::{ConfigOverrides, GatewayConfig, HistoryGateway};
use history_telemetry::{init_logging, TelemetryConfig};
use std::path::PathBuf;
use tracing::{info, warn};

/// History API over time-sharded Elasticsearch indices
#[derive(Parser, Debug)]
#[command(name = "history-gateway", version)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "HISTORY_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP port, overrides the file
    #[arg(long, env = "HISTORY_PORT")]
    port: Option<u16>,

    /// Elasticsearch base URL, overrides the file
    #[arg(long, env = "HISTORY_ELASTIC_URL")]
    elastic_url: Option<String>,

    /// Chain node base URL; enables packed transaction backfill
    #[arg(long, env = "HISTORY_CHAIN_NODE_URL")]
    chain_node_url: Option<String>,
}

impl Cli {
    fn load_config(&self) -> Result<GatewayConfig> {
        let mut config = match &self.config {
            Some(path) => GatewayConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => GatewayConfig::default(),
        };
        ConfigOverrides {
            port: self.port,
            elastic_url: self.elastic_url.clone(),
            chain_node_url: self.chain_node_url.clone(),
        }
        .apply(&mut config);
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let telemetry = TelemetryConfig::from_env();
    init_logging(&telemetry).context("initializing logging")?;

    let config = cli.load_config()?;
    info!(
        version = history_gateway::VERSION,
        addr = %config.http_addr(),
        elastic = %config.elastic.url,
        "Starting history gateway"
    );

    let gateway = HistoryGateway::new(config).context("invalid configuration")?;
    gateway.serve(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => warn!(error = %e, "Cannot listen for shutdown signal, stopping"),
    }
}
