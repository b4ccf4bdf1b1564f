//! # Inbound Ports (Driving Ports)
//!
//! The four history operations exposed over `/v1/history/*`, plus the index
//! summary reported by the health endpoint.

use crate::domain::{
    GetActionsResult, GetControlledAccountsResult, GetKeyAccountsResult, GetTransactionResult,
    HistoryError, HistoryResult,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of `get_actions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetActionsParams {
    pub account_name: String,
    /// Anchor in the account's action index; negative counts from the tail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<i64>,
    /// Signed page size relative to `pos`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

/// Body of `get_transaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetTransactionParams {
    pub id: String,
    /// Block to ask the chain node for when the stored document has no
    /// `block_num`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_num_hint: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetKeyAccountsParams {
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetControlledAccountsParams {
    pub controlling_account: String,
}

fn require(field: &str, value: &str) -> HistoryResult<()> {
    if value.trim().is_empty() {
        return Err(HistoryError::InvalidParams(format!("{} must not be empty", field)));
    }
    Ok(())
}

impl GetActionsParams {
    pub fn validate(&self) -> HistoryResult<()> {
        require("account_name", &self.account_name)
    }
}

impl GetTransactionParams {
    pub fn validate(&self) -> HistoryResult<()> {
        require("id", &self.id)
    }
}

impl GetKeyAccountsParams {
    pub fn validate(&self) -> HistoryResult<()> {
        require("public_key", &self.public_key)
    }
}

impl GetControlledAccountsParams {
    pub fn validate(&self) -> HistoryResult<()> {
        require("controlling_account", &self.controlling_account)
    }
}

/// Primary API of the history engine.
#[async_trait::async_trait]
pub trait HistoryApi: Send + Sync {
    /// Page through the actions of one account.
    ///
    /// An empty window returns an empty page without touching the backend.
    async fn get_actions(&self, params: GetActionsParams) -> HistoryResult<GetActionsResult>;

    /// Fetch a transaction with its traces, backfilling the packed payload
    /// from the chain node when one is configured.
    ///
    /// - `Err(NotFound)`: the transaction or its trace is in no shard
    async fn get_transaction(
        &self,
        params: GetTransactionParams,
    ) -> HistoryResult<GetTransactionResult>;

    /// Accounts holding `public_key` in any permission.
    async fn get_key_accounts(
        &self,
        params: GetKeyAccountsParams,
    ) -> HistoryResult<GetKeyAccountsResult>;

    /// Accounts controlled by `controlling_account`.
    async fn get_controlled_accounts(
        &self,
        params: GetControlledAccountsParams,
    ) -> HistoryResult<GetControlledAccountsResult>;

    /// Known shard count per index prefix.
    fn index_summary(&self) -> BTreeMap<&'static str, usize>;
}
