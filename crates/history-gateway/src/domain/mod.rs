//! Domain types for the gateway: configuration, error bodies, request ids.

pub mod config;
pub mod error;
pub mod request_id;

pub use config::{
    ChainNodeConfig, ConfigError, ConfigOverrides, CorsConfig, ElasticConfig, GatewayConfig, HttpConfig,
    LimitsConfig, TimeoutConfig,
};
pub use error::{ApiError, GatewayError, INVALID_ARGUMENTS};
pub use request_id::{RequestId, REQUEST_ID_HEADER};
