//! # In-Memory Backends
//!
//! A search engine and a chain node that live in process memory. They follow
//! the Elasticsearch semantics the history engine relies on (dotted field
//! paths through arrays, `.keyword` sub-fields, `from`/`size` paging, per-entry
//! errors inside multi requests) and record every call so tests can assert on
//! the exact backend traffic.

use crate::domain::{Direction, GlobalSequence};
use crate::ports::{
    BackendError, BackendResult, BlockTransaction, ChainBlock, ChainNode, DocRef, FetchedDoc,
    SearchBackend, SearchHit, SearchQuery, SearchRequest, ShardResponse,
};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    ListIndices,
    Count(String),
    MultiGet(Vec<DocRef>),
    MultiSearch(Vec<SearchRequest>),
}

type Documents = BTreeMap<String, Value>;

/// In-memory search engine.
#[derive(Default)]
pub struct InMemorySearch {
    indices: RwLock<BTreeMap<String, Documents>>,
    failing: RwLock<HashSet<String>>,
    unreachable: AtomicBool,
    calls: Mutex<Vec<BackendCall>>,
}

impl InMemorySearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_index(&self, index: &str) {
        self.indices.write().entry(index.to_string()).or_default();
    }

    /// Store `doc` under `id`, creating the index if needed.
    pub fn insert(&self, index: &str, id: &str, doc: Value) {
        self.indices
            .write()
            .entry(index.to_string())
            .or_default()
            .insert(id.to_string(), doc);
    }

    /// Make every count and search on `index` fail with a status error.
    pub fn fail_index(&self, index: &str) {
        self.failing.write().insert(index.to_string());
    }

    /// Make every call fail with a transport error.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: BackendCall) -> BackendResult<()> {
        self.calls.lock().push(call);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(BackendError::Transport("connection refused".into()));
        }
        Ok(())
    }

    fn check_index(&self, index: &str) -> Result<(), String> {
        if self.failing.read().contains(index) {
            return Err(format!("search_phase_execution_exception on {}", index));
        }
        if !self.indices.read().contains_key(index) {
            return Err(format!("index_not_found_exception: {}", index));
        }
        Ok(())
    }

    fn matching(&self, index: &str, query: &SearchQuery) -> Vec<(String, Value)> {
        self.indices
            .read()
            .get(index)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| query_matches(query, doc))
                    .map(|(id, doc)| (id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn search(&self, request: &SearchRequest) -> ShardResponse {
        if let Err(reason) = self.check_index(&request.index) {
            return ShardResponse::failed(reason);
        }

        let mut docs = self.matching(&request.index, &request.query);
        if let Some(sort) = &request.sort {
            docs.sort_by_key(|(_, doc)| sort_key(doc, &sort.field));
            if sort.direction == Direction::Descending {
                docs.reverse();
            }
        }

        let hits = docs
            .into_iter()
            .skip(request.from as usize)
            .take(request.size as usize)
            .map(|(id, source)| SearchHit {
                index: request.index.clone(),
                id,
                source,
            })
            .collect();
        ShardResponse::with_hits(hits)
    }
}

#[async_trait::async_trait]
impl SearchBackend for InMemorySearch {
    async fn list_indices(&self) -> BackendResult<Vec<String>> {
        self.record(BackendCall::ListIndices)?;
        Ok(self.indices.read().keys().cloned().collect())
    }

    async fn count(&self, index: &str, query: &SearchQuery) -> BackendResult<u64> {
        self.record(BackendCall::Count(index.to_string()))?;
        self.check_index(index).map_err(|reason| BackendError::Status {
            status: 404,
            reason,
        })?;
        Ok(self.matching(index, query).len() as u64)
    }

    async fn multi_get(&self, refs: &[DocRef]) -> BackendResult<Vec<FetchedDoc>> {
        self.record(BackendCall::MultiGet(refs.to_vec()))?;
        let indices = self.indices.read();

        Ok(refs
            .iter()
            .map(|r| {
                let (found, source, error) = match indices.get(&r.index) {
                    None => (false, None, Some(format!("index_not_found_exception: {}", r.index))),
                    Some(docs) => match docs.get(&r.id) {
                        Some(doc) => (true, Some(doc.clone()), None),
                        None => (false, None, None),
                    },
                };
                FetchedDoc {
                    index: r.index.clone(),
                    id: r.id.clone(),
                    found,
                    source,
                    error,
                }
            })
            .collect())
    }

    async fn multi_search(&self, requests: &[SearchRequest]) -> BackendResult<Vec<ShardResponse>> {
        self.record(BackendCall::MultiSearch(requests.to_vec()))?;
        Ok(requests.iter().map(|r| self.search(r)).collect())
    }
}

/// Every value reachable through a dotted path, descending into arrays.
fn values_at<'a>(doc: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![doc];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            collect_field(value, segment, &mut next);
        }
        current = next;
    }

    let mut leaves = Vec::new();
    for value in current {
        match value {
            Value::Array(items) => leaves.extend(items.iter()),
            other => leaves.push(other),
        }
    }
    leaves
}

fn collect_field<'a>(value: &'a Value, field: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(object) => {
            if let Some(child) = object.get(field) {
                out.push(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_field(item, field, out);
            }
        }
        _ => {}
    }
}

fn field_matches(doc: &Value, field: &str, expected: &str) -> bool {
    let field = field.strip_suffix(".keyword").unwrap_or(field);
    values_at(doc, field).into_iter().any(|v| match v {
        Value::String(s) => s == expected,
        Value::Number(n) => n.to_string() == expected,
        _ => false,
    })
}

fn query_matches(query: &SearchQuery, doc: &Value) -> bool {
    match query {
        SearchQuery::AnyFieldMatches { value, fields } => {
            fields.iter().any(|field| field_matches(doc, field, value))
        }
        SearchQuery::FieldMatches { field, value } => field_matches(doc, field, value),
    }
}

/// Documents without a readable sort value go last in ascending order.
fn sort_key(doc: &Value, field: &str) -> (bool, Option<GlobalSequence>) {
    let key = values_at(doc, field)
        .into_iter()
        .find_map(GlobalSequence::from_value);
    (key.is_none(), key)
}

/// In-memory chain node.
#[derive(Default)]
pub struct InMemoryChainNode {
    blocks: RwLock<HashMap<u64, ChainBlock>>,
    down: AtomicBool,
    requested: Mutex<Vec<u64>>,
}

impl InMemoryChainNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a block whose `transactions[].trx` entries are `trxs`.
    pub fn insert_block(&self, block_num: u64, trxs: Vec<Value>) {
        let block = ChainBlock {
            transactions: trxs.into_iter().map(|trx| BlockTransaction { trx }).collect(),
        };
        self.blocks.write().insert(block_num, block);
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Block numbers requested so far.
    pub fn requested(&self) -> Vec<u64> {
        self.requested.lock().clone()
    }
}

#[async_trait::async_trait]
impl ChainNode for InMemoryChainNode {
    async fn get_block(&self, block_num: u64) -> BackendResult<ChainBlock> {
        self.requested.lock().push(block_num);
        if self.down.load(Ordering::SeqCst) {
            return Err(BackendError::Transport("chain node unreachable".into()));
        }
        self.blocks
            .read()
            .get(&block_num)
            .cloned()
            .ok_or_else(|| BackendError::Status {
                status: 500,
                reason: format!("unknown block {}", block_num),
            })
    }
}
