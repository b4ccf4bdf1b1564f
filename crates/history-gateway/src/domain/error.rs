//! HTTP error body and gateway startup errors.
//!
//! Every failed request answers `{code, message}` where `code` repeats the
//! HTTP status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use history_core::HistoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, warn};

/// Message for every malformed request.
pub const INVALID_ARGUMENTS: &str = "Invalid arguments.";

/// Error body returned to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP status code
    pub code: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
        }
    }

    /// Body could not be read or decoded.
    pub fn invalid_arguments() -> Self {
        Self::new(StatusCode::BAD_REQUEST, INVALID_ARGUMENTS)
    }

    /// Anything but GET on a history route.
    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, INVALID_ARGUMENTS)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, message)
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<HistoryError> for ApiError {
    fn from(e: HistoryError) -> Self {
        match &e {
            HistoryError::NotFound { .. } => Self::not_found(e.to_string()),
            HistoryError::InvalidParams(_) => Self::new(StatusCode::BAD_REQUEST, e.to_string()),
            HistoryError::Backend(_) => {
                warn!(error = %e, "Search backend failure");
                Self::unavailable(e.to_string())
            }
            HistoryError::Integrity(_) => {
                error!(error = %e, "History data integrity failure");
                Self::internal(e.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(_: serde_json::Error) -> Self {
        Self::invalid_arguments()
    }
}

/// Errors that stop the gateway from starting or serving.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    /// An HTTP client for a backend could not be built
    #[error("backend client error: {0}")]
    Client(String),

    #[error("server error: {0}")]
    Server(String),
}

impl From<super::config::ConfigError> for GatewayError {
    fn from(e: super::config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
