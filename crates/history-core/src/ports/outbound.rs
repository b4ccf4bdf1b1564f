//! # Outbound Ports (Driven Ports)
//!
//! What the history engine needs from the outside world: a search engine
//! holding the sharded indices, and optionally a chain node to recover packed
//! transactions from.

use crate::domain::Direction;
use serde::Deserialize;
use serde_json::Value;

/// Failure talking to the search engine or the chain node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Connection refused, timed out, reset.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {reason}")]
    Status { status: u16, reason: String },

    /// The backend answered with a body we could not decode.
    #[error("decode error: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Query clauses the history engine issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// The value matches at least one of `fields` (scored multi-match).
    AnyFieldMatches { value: String, fields: Vec<String> },
    /// The value matches `field` (non-scoring filter).
    FieldMatches { field: String, value: String },
}

impl SearchQuery {
    /// Actions received by or authorized by `account`.
    pub fn account_actions(account: &str) -> Self {
        Self::AnyFieldMatches {
            value: account.to_string(),
            fields: vec!["receipt.receiver".into(), "act.authorization.actor".into()],
        }
    }

    /// Accounts with `public_key` in any permission.
    pub fn accounts_by_key(public_key: &str) -> Self {
        Self::FieldMatches {
            field: "pub_keys.key".into(),
            value: public_key.to_string(),
        }
    }

    /// The account document named exactly `name`.
    pub fn account_by_name(name: &str) -> Self {
        Self::FieldMatches {
            field: "name.keyword".into(),
            value: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub field: String,
    pub direction: Direction,
}

impl SortOrder {
    pub fn by_global_sequence(direction: Direction) -> Self {
        Self {
            field: "receipt.global_sequence".into(),
            direction,
        }
    }
}

/// One entry of a multi-search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub index: String,
    pub query: SearchQuery,
    pub sort: Option<SortOrder>,
    pub from: u64,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub index: String,
    pub id: String,
    pub source: Value,
}

/// Answer to one multi-search entry. A per-entry `error` leaves `hits` empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShardResponse {
    pub hits: Vec<SearchHit>,
    pub error: Option<String>,
}

impl ShardResponse {
    pub fn with_hits(hits: Vec<SearchHit>) -> Self {
        Self { hits, error: None }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            hits: Vec::new(),
            error: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRef {
    pub index: String,
    pub id: String,
}

impl DocRef {
    pub fn new(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
        }
    }
}

/// Answer to one multi-get entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDoc {
    pub index: String,
    pub id: String,
    pub found: bool,
    pub source: Option<Value>,
    pub error: Option<String>,
}

impl FetchedDoc {
    /// Source of a found, error-free document.
    pub fn usable_source(&self) -> Option<&Value> {
        if self.found && self.error.is_none() {
            self.source.as_ref()
        } else {
            None
        }
    }
}

/// Search engine holding the time-sharded history indices.
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// Names of every index the engine knows.
    async fn list_indices(&self) -> BackendResult<Vec<String>>;

    /// Number of documents of `index` matching `query`.
    async fn count(&self, index: &str, query: &SearchQuery) -> BackendResult<u64>;

    /// Fetch documents by id. One `FetchedDoc` per ref, in request order.
    async fn multi_get(&self, refs: &[DocRef]) -> BackendResult<Vec<FetchedDoc>>;

    /// Run several searches in one round trip. One `ShardResponse` per
    /// request, in request order.
    async fn multi_search(&self, requests: &[SearchRequest]) -> BackendResult<Vec<ShardResponse>>;
}

/// `transactions[]` entry of a chain block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockTransaction {
    #[serde(default)]
    pub trx: Value,
}

/// The part of a `get_block` answer used for backfill.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ChainBlock {
    #[serde(default)]
    pub transactions: Vec<BlockTransaction>,
}

/// Chain node block API.
#[async_trait::async_trait]
pub trait ChainNode: Send + Sync {
    async fn get_block(&self, block_num: u64) -> BackendResult<ChainBlock>;
}
