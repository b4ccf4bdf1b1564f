//! Gateway service: wires the backend clients, the history engine and the
//! HTTP server together.

use crate::adapters::{ChainNodeClient, ElasticClient};
use crate::domain::{GatewayConfig, GatewayError};
use crate::middleware::GatewayMetrics;
use crate::router::{build_router, AppState};
use history_core::{HistoryApi, HistoryService};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub struct HistoryGateway {
    config: GatewayConfig,
    metrics: Arc<GatewayMetrics>,
}

impl HistoryGateway {
    /// Validates `config`; nothing is contacted yet.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        config.validate()?;
        Ok(Self {
            config,
            metrics: Arc::new(GatewayMetrics::new()),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Build the backend clients and discover the index catalog.
    ///
    /// An unreachable search engine leaves the catalog empty; the gateway
    /// still starts and answers with empty results until restarted.
    pub async fn build_api(&self) -> Result<Arc<dyn HistoryApi>, GatewayError> {
        let elastic = ElasticClient::new(&self.config.elastic)?;
        info!(url = %elastic.base_url(), "Discovering history indices");

        let mut service = HistoryService::discover(Arc::new(elastic))
            .await
            .with_config(self.config.service_config());

        match ChainNodeClient::from_config(
            &self.config.chain_node,
            self.config.elastic.connect_timeout,
        )? {
            Some(chain) => {
                info!("Packed transaction backfill enabled");
                service = service.with_chain_node(Arc::new(chain));
            }
            None => info!("No chain node configured, backfill disabled"),
        }

        Ok(Arc::new(service))
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind {
                addr: addr.to_string(),
                reason: e.to_string(),
            })?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let api = self.build_api().await?;
        let router = build_router(AppState::new(api, self.metrics()), &self.config);

        let local = listener
            .local_addr()
            .map_err(|e| GatewayError::Server(e.to_string()))?;
        info!(addr = %local, "History gateway listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::Server(e.to_string()))?;

        info!("History gateway stopped");
        Ok(())
    }
}
