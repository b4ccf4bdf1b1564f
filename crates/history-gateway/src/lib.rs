//! # History Gateway
//!
//! HTTP front end of the history API. Serves `/v1/history/*` on top of
//! [`history_core::HistoryService`], with Elasticsearch and chain node
//! clients implementing its outbound ports.
//!
//! ## Layout
//!
//! - **Domain** (`domain/`): configuration, error bodies, request ids
//! - **Adapters** (`adapters/`): `ElasticClient`, `ChainNodeClient` (reqwest)
//! - **Middleware** (`middleware/`): CORS, request tracing, metrics, timeout, GET-only gate
//! - **Router** (`router.rs`): the four history routes plus `/health` and `/metrics`
//! - **Service** (`service.rs`): startup wiring and graceful shutdown

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod middleware;
pub mod router;
pub mod service;

pub use adapters::{ChainNodeClient, ElasticClient};
pub use domain::{ApiError, ConfigError, ConfigOverrides, GatewayConfig, GatewayError};
pub use middleware::GatewayMetrics;
pub use router::{build_router, AppState};
pub use service::HistoryGateway;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
