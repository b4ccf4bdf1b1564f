//! HTTP routes of the history API.
//!
//! The four history endpoints are GET routes carrying a JSON body, the way
//! the chain node's own history plugin answers them.

use crate::domain::{ApiError, GatewayConfig};
use crate::middleware::{
    create_cors_layer, GatewayMetrics, MethodGateLayer, MetricsLayer, TimeoutLayer, TracingLayer,
};
use axum::{
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use history_core::{
    GetActionsParams, GetActionsResult, GetControlledAccountsParams, GetControlledAccountsResult,
    GetKeyAccountsParams, GetKeyAccountsResult, GetTransactionParams, GetTransactionResult,
    HistoryApi,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::debug;

pub const GET_ACTIONS_PATH: &str = "/v1/history/get_actions";
pub const GET_TRANSACTION_PATH: &str = "/v1/history/get_transaction";
pub const GET_KEY_ACCOUNTS_PATH: &str = "/v1/history/get_key_accounts";
pub const GET_CONTROLLED_ACCOUNTS_PATH: &str = "/v1/history/get_controlled_accounts";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn HistoryApi>,
    pub metrics: Arc<GatewayMetrics>,
}

impl AppState {
    pub fn new(api: Arc<dyn HistoryApi>, metrics: Arc<GatewayMetrics>) -> Self {
        Self { api, metrics }
    }
}

/// Routes plus the middleware stack configured by `config`.
pub fn build_router(state: AppState, config: &GatewayConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(create_cors_layer(&config.cors))
        .layer(TracingLayer::new())
        .layer(MetricsLayer::new(Arc::clone(&state.metrics)))
        .layer(TimeoutLayer::new(config.timeouts.request))
        .layer(MethodGateLayer::new());

    Router::new()
        .route(GET_ACTIONS_PATH, get(get_actions))
        .route(GET_TRANSACTION_PATH, get(get_transaction))
        .route(GET_KEY_ACCOUNTS_PATH, get(get_key_accounts))
        .route(GET_CONTROLLED_ACCOUNTS_PATH, get(get_controlled_accounts))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(config.limits.max_request_size))
        .layer(middleware)
        .with_state(state)
}

/// Decode a request body. Unreadable, oversized and malformed bodies all
/// answer `Invalid arguments.`; an oversized body keeps its 413 status.
fn parse_body<T: DeserializeOwned>(body: Result<Bytes, BytesRejection>) -> Result<T, ApiError> {
    let bytes = body.map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "Unreadable request body");
        ApiError::new(rejection.status(), crate::domain::INVALID_ARGUMENTS)
    })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        debug!(error = %e, "Malformed request body");
        ApiError::from(e)
    })
}

async fn get_actions(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<GetActionsResult>, ApiError> {
    let params: GetActionsParams = parse_body(body)?;
    Ok(Json(state.api.get_actions(params).await?))
}

async fn get_transaction(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<GetTransactionResult>, ApiError> {
    let params: GetTransactionParams = parse_body(body)?;
    Ok(Json(state.api.get_transaction(params).await?))
}

async fn get_key_accounts(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<GetKeyAccountsResult>, ApiError> {
    let params: GetKeyAccountsParams = parse_body(body)?;
    Ok(Json(state.api.get_key_accounts(params).await?))
}

async fn get_controlled_accounts(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<GetControlledAccountsResult>, ApiError> {
    let params: GetControlledAccountsParams = parse_body(body)?;
    Ok(Json(state.api.get_controlled_accounts(params).await?))
}

/// Health check endpoint with the shard count per index prefix.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let indices = state.api.index_summary();
    let status = if indices.values().any(|&shards| shards > 0) {
        "healthy"
    } else {
        "no_indices"
    };
    Json(serde_json::json!({
        "status": status,
        "service": "history-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "indices": indices,
    }))
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.to_json())
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found.")
}
