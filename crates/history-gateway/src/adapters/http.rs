//! Shared reqwest plumbing for the backend clients.

use crate::domain::GatewayError;
use history_core::ports::{BackendError, BackendResult};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Longest backend error body kept in a `BackendError::Status`.
const MAX_REASON_LEN: usize = 256;

pub(crate) fn build_client(
    request_timeout: Duration,
    connect_timeout: Duration,
) -> Result<Client, GatewayError> {
    Client::builder()
        .timeout(request_timeout)
        .connect_timeout(connect_timeout)
        .build()
        .map_err(|e| GatewayError::Client(e.to_string()))
}

/// `base` joined with `path`, tolerating a trailing slash on `base`.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub(crate) fn transport_error(e: reqwest::Error) -> BackendError {
    if e.is_decode() {
        BackendError::Decode(e.to_string())
    } else {
        BackendError::Transport(e.to_string())
    }
}

/// Decode a JSON answer, turning non-2xx statuses into `BackendError::Status`.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
    let status = response.status();
    let body = response.bytes().await.map_err(transport_error)?;

    if !status.is_success() {
        let reason = serde_json::from_slice::<Value>(&body)
            .ok()
            .and_then(|v| v.get("error").map(error_reason))
            .unwrap_or_else(|| truncate(&String::from_utf8_lossy(&body)));
        return Err(BackendError::Status {
            status: status.as_u16(),
            reason,
        });
    }

    serde_json::from_slice(&body).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Readable form of an Elasticsearch `error` value: either a plain string or
/// an object with `type` and `reason`.
pub(crate) fn error_reason(error: &Value) -> String {
    match error {
        Value::String(s) => truncate(s),
        Value::Object(map) => {
            let kind = map.get("type").and_then(Value::as_str);
            let reason = map.get("reason").and_then(Value::as_str);
            match (kind, reason) {
                (Some(kind), Some(reason)) => truncate(&format!("{}: {}", kind, reason)),
                (Some(text), None) | (None, Some(text)) => truncate(text),
                (None, None) => truncate(&error.to_string()),
            }
        }
        other => truncate(&other.to_string()),
    }
}

fn truncate(s: &str) -> String {
    match s.char_indices().nth(MAX_REASON_LEN) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://es:9200/", "/_mget"), "http://es:9200/_mget");
        assert_eq!(join_url("http://es:9200", "a-0/_count"), "http://es:9200/a-0/_count");
    }

    #[test]
    fn test_error_reason_forms() {
        assert_eq!(
            error_reason(&json!({"type": "index_not_found_exception", "reason": "no such index"})),
            "index_not_found_exception: no such index"
        );
        assert_eq!(error_reason(&json!("boom")), "boom");
        assert_eq!(error_reason(&json!({"reason": "shard failed"})), "shard failed");
    }

    #[test]
    fn test_long_reason_truncated() {
        let long = "x".repeat(1000);
        let reason = error_reason(&json!(long));
        assert_eq!(reason.len(), MAX_REASON_LEN + 3);
        assert!(reason.ends_with("..."));
    }
}
