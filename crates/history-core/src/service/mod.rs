//! # History Service
//!
//! Drives the domain through the outbound ports. One `HistoryService` is built
//! at startup and shared by every request; it holds no mutable state.

mod accounts;
mod actions;
mod transaction;

use crate::domain::{
    GetActionsResult, GetControlledAccountsResult, GetKeyAccountsResult, GetTransactionResult,
    HistoryResult, IndexCatalog, IndexPrefix,
};
use crate::ports::{
    ChainNode, GetActionsParams, GetControlledAccountsParams, GetKeyAccountsParams,
    GetTransactionParams, HistoryApi, SearchBackend,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Tunables of the history engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// `size` of each per-shard account search.
    pub lookup_page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            lookup_page_size: 1000,
        }
    }
}

impl IndexCatalog {
    /// List the backend's indices and group them by `prefixes`.
    ///
    /// An unreachable or failing backend yields an empty catalog so the
    /// process keeps serving "no data" answers.
    pub async fn discover(backend: &dyn SearchBackend, prefixes: &[IndexPrefix]) -> Self {
        match backend.list_indices().await {
            Ok(names) => {
                let catalog = Self::from_index_names(names, prefixes);
                info!(indices = ?catalog.summary(), "Index catalog discovered");
                catalog
            }
            Err(e) => {
                warn!(error = %e, "Index discovery failed, serving with an empty catalog");
                Self::empty()
            }
        }
    }
}

/// The history engine.
pub struct HistoryService {
    backend: Arc<dyn SearchBackend>,
    chain: Option<Arc<dyn ChainNode>>,
    catalog: IndexCatalog,
    config: ServiceConfig,
}

impl HistoryService {
    pub fn new(backend: Arc<dyn SearchBackend>, catalog: IndexCatalog) -> Self {
        Self {
            backend,
            chain: None,
            catalog,
            config: ServiceConfig::default(),
        }
    }

    /// Enable best-effort packed transaction backfill.
    pub fn with_chain_node(mut self, chain: Arc<dyn ChainNode>) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Discover the catalog from `backend` and build the service on top.
    pub async fn discover(backend: Arc<dyn SearchBackend>) -> Self {
        let catalog = IndexCatalog::discover(backend.as_ref(), &IndexPrefix::ALL).await;
        Self::new(backend, catalog)
    }

    pub fn catalog(&self) -> &IndexCatalog {
        &self.catalog
    }
}

#[async_trait::async_trait]
impl HistoryApi for HistoryService {
    async fn get_actions(&self, params: GetActionsParams) -> HistoryResult<GetActionsResult> {
        self.fetch_actions(params).await
    }

    async fn get_transaction(
        &self,
        params: GetTransactionParams,
    ) -> HistoryResult<GetTransactionResult> {
        self.fetch_transaction(params).await
    }

    async fn get_key_accounts(
        &self,
        params: GetKeyAccountsParams,
    ) -> HistoryResult<GetKeyAccountsResult> {
        self.fetch_key_accounts(params).await
    }

    async fn get_controlled_accounts(
        &self,
        params: GetControlledAccountsParams,
    ) -> HistoryResult<GetControlledAccountsResult> {
        self.fetch_controlled_accounts(params).await
    }

    fn index_summary(&self) -> BTreeMap<&'static str, usize> {
        self.catalog.summary()
    }
}
