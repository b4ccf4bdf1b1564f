//! # Domain Errors
//!
//! Error taxonomy for history requests. The HTTP layer maps each variant to a
//! status code; the core never decides on status codes itself.

use crate::ports::BackendError;

/// Errors that can occur while answering a history request.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// The requested transaction or account exists in no shard.
    #[error("{what} not found")]
    NotFound { what: String },

    /// Request parameters are missing or malformed.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// Search engine unreachable or returned a transport-level failure.
    #[error("backend failure: {0}")]
    Backend(#[from] BackendError),

    /// Stored data contradicts itself: a stub whose trace cannot be
    /// reconciled, or a document that does not match its schema.
    #[error("data integrity: {0}")]
    Integrity(String),
}

impl HistoryError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn integrity(details: impl Into<String>) -> Self {
        Self::Integrity(details.into())
    }

    /// Whether the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}

/// Result type for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;
