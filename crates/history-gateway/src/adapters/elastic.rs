//! Elasticsearch REST client implementing `SearchBackend`.
//!
//! Four endpoints are used:
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | `list_indices` | `GET /_cat/indices?h=index&format=json` |
//! | `count` | `POST /<index>/_count` |
//! | `multi_get` | `POST /_mget` |
//! | `multi_search` | `POST /_msearch` (NDJSON) |

use super::http::{build_client, error_reason, join_url, read_json, transport_error};
use crate::domain::{ElasticConfig, GatewayError};
use async_trait::async_trait;
use history_core::ports::{
    BackendError, BackendResult, DocRef, FetchedDoc, SearchBackend, SearchHit, SearchQuery,
    SearchRequest, ShardResponse, SortOrder,
};
use history_core::Direction;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

pub struct ElasticClient {
    client: Client,
    base_url: String,
}

impl ElasticClient {
    pub fn new(config: &ElasticConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            client: build_client(config.request_timeout, config.connect_timeout)?,
            base_url: config.url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

#[async_trait]
impl SearchBackend for ElasticClient {
    async fn list_indices(&self) -> BackendResult<Vec<String>> {
        let response = self
            .client
            .get(self.url("_cat/indices?h=index&format=json"))
            .send()
            .await
            .map_err(transport_error)?;
        let rows: Vec<CatIndexRow> = read_json(response).await?;
        Ok(rows.into_iter().map(|row| row.index).collect())
    }

    async fn count(&self, index: &str, query: &SearchQuery) -> BackendResult<u64> {
        let response = self
            .client
            .post(self.url(&format!("{}/_count", index)))
            .json(&json!({ "query": query_dsl(query) }))
            .send()
            .await
            .map_err(transport_error)?;
        let body: CountResponse = read_json(response).await?;
        debug!(index, count = body.count, "Counted");
        Ok(body.count)
    }

    async fn multi_get(&self, refs: &[DocRef]) -> BackendResult<Vec<FetchedDoc>> {
        if refs.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(self.url("_mget"))
            .json(&mget_body(refs))
            .send()
            .await
            .map_err(transport_error)?;
        let body: MgetResponse = read_json(response).await?;
        if body.docs.len() != refs.len() {
            return Err(BackendError::Decode(format!(
                "_mget answered {} docs for {} refs",
                body.docs.len(),
                refs.len()
            )));
        }

        Ok(body.docs.into_iter().map(MgetDoc::into_fetched).collect())
    }

    async fn multi_search(&self, requests: &[SearchRequest]) -> BackendResult<Vec<ShardResponse>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(self.url("_msearch"))
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(msearch_body(requests))
            .send()
            .await
            .map_err(transport_error)?;
        let body: MsearchResponse = read_json(response).await?;
        if body.responses.len() != requests.len() {
            return Err(BackendError::Decode(format!(
                "_msearch answered {} responses for {} requests",
                body.responses.len(),
                requests.len()
            )));
        }

        Ok(body
            .responses
            .into_iter()
            .map(MsearchItem::into_shard_response)
            .collect())
    }
}

/// Query DSL for one `SearchQuery`.
pub(crate) fn query_dsl(query: &SearchQuery) -> Value {
    match query {
        SearchQuery::AnyFieldMatches { value, fields } => json!({
            "bool": {
                "must": [{ "multi_match": { "query": value, "fields": fields } }]
            }
        }),
        SearchQuery::FieldMatches { field, value } => {
            let mut clause = Map::new();
            clause.insert(field.clone(), Value::String(value.clone()));
            json!({
                "bool": {
                    "filter": [{ "match": clause }]
                }
            })
        }
    }
}

fn sort_dsl(sort: &SortOrder) -> Value {
    let order = match sort.direction {
        Direction::Ascending => "asc",
        Direction::Descending => "desc",
    };
    let mut clause = Map::new();
    clause.insert(sort.field.clone(), json!({ "order": order }));
    Value::Array(vec![Value::Object(clause)])
}

fn mget_body(refs: &[DocRef]) -> Value {
    let docs: Vec<Value> = refs
        .iter()
        .map(|r| json!({ "_index": r.index, "_id": r.id }))
        .collect();
    json!({ "docs": docs })
}

/// Header line and body line per request, each newline-terminated.
pub(crate) fn msearch_body(requests: &[SearchRequest]) -> String {
    let mut ndjson = String::new();
    for request in requests {
        let header = json!({ "index": request.index });
        let mut body = json!({
            "query": query_dsl(&request.query),
            "from": request.from,
            "size": request.size,
        });
        if let (Some(sort), Some(map)) = (&request.sort, body.as_object_mut()) {
            map.insert("sort".into(), sort_dsl(sort));
        }
        ndjson.push_str(&header.to_string());
        ndjson.push('\n');
        ndjson.push_str(&body.to_string());
        ndjson.push('\n');
    }
    ndjson
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct CatIndexRow {
    index: String,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Deserialize)]
struct MgetResponse {
    #[serde(default)]
    docs: Vec<MgetDoc>,
}

#[derive(Deserialize)]
struct MgetDoc {
    #[serde(rename = "_index", default)]
    index: String,
    #[serde(rename = "_id", default)]
    id: String,
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source")]
    source: Option<Value>,
    error: Option<Value>,
}

impl MgetDoc {
    fn into_fetched(self) -> FetchedDoc {
        FetchedDoc {
            index: self.index,
            id: self.id,
            found: self.found,
            source: self.source,
            error: self.error.as_ref().map(error_reason),
        }
    }
}

#[derive(Deserialize)]
struct MsearchResponse {
    #[serde(default)]
    responses: Vec<MsearchItem>,
}

#[derive(Deserialize)]
struct MsearchItem {
    hits: Option<HitsEnvelope>,
    error: Option<Value>,
}

impl MsearchItem {
    fn into_shard_response(self) -> ShardResponse {
        if let Some(error) = &self.error {
            return ShardResponse::failed(error_reason(error));
        }
        let hits = self
            .hits
            .map(|envelope| envelope.hits)
            .unwrap_or_default()
            .into_iter()
            .map(|hit| SearchHit {
                index: hit.index,
                id: hit.id,
                source: hit.source,
            })
            .collect();
        ShardResponse::with_hits(hits)
    }
}

#[derive(Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Deserialize)]
struct RawHit {
    #[serde(rename = "_index", default)]
    index: String,
    #[serde(rename = "_id", default)]
    id: String,
    #[serde(rename = "_source", default)]
    source: Value,
}
