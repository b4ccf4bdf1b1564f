//! Chain node client used for packed transaction backfill.

use super::http::{build_client, join_url, read_json, transport_error};
use crate::domain::{ChainNodeConfig, GatewayError};
use async_trait::async_trait;
use history_core::ports::{BackendResult, ChainBlock, ChainNode};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const GET_BLOCK_PATH: &str = "v1/chain/get_block";

/// Calls `POST /v1/chain/get_block` on a chain node.
pub struct ChainNodeClient {
    client: Client,
    base_url: String,
}

impl ChainNodeClient {
    /// `None` while no chain node URL is configured.
    pub fn from_config(
        config: &ChainNodeConfig,
        connect_timeout: Duration,
    ) -> Result<Option<Self>, GatewayError> {
        let Some(url) = &config.url else {
            return Ok(None);
        };
        let client = build_client(config.request_timeout, connect_timeout)?;
        Ok(Some(Self {
            client,
            base_url: url.clone(),
        }))
    }
}

#[async_trait]
impl ChainNode for ChainNodeClient {
    async fn get_block(&self, block_num: u64) -> BackendResult<ChainBlock> {
        debug!(block_num, "Fetching block from chain node");
        let response = self
            .client
            .post(join_url(&self.base_url, GET_BLOCK_PATH))
            .json(&json!({ "block_num_or_id": block_num }))
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }
}
