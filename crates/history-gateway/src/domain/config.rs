//! Gateway configuration with validation.
//!
//! Loaded from a JSON file; every section has defaults so a partial file (or
//! none at all) is enough to start.

use history_core::ServiceConfig;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Search engine holding the history indices
    pub elastic: ElasticConfig,
    /// Chain node used for packed transaction backfill
    pub chain_node: ChainNodeConfig,
    /// Request and lookup limits
    pub limits: LimitsConfig,
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
    /// CORS configuration
    pub cors: CorsConfig,
}

impl GatewayConfig {
    /// Read a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.elastic.url.trim().is_empty() {
            return Err(ConfigError::Invalid("elastic.url cannot be empty".into()));
        }

        if let Some(url) = &self.chain_node.url {
            if url.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "chain_node.url cannot be empty when set".into(),
                ));
            }
        }

        if self.limits.max_request_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_request_size cannot be 0".into(),
            ));
        }

        if self.limits.lookup_page_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "lookup_page_size cannot be 0".into(),
            ));
        }

        let timeouts = [
            ("timeouts.request", self.timeouts.request),
            ("elastic.request_timeout", self.elastic.request_timeout),
            ("elastic.connect_timeout", self.elastic.connect_timeout),
            ("chain_node.request_timeout", self.chain_node.request_timeout),
        ];
        for (name, value) in timeouts {
            if value.is_zero() {
                return Err(ConfigError::InvalidTimeout(format!("{} cannot be 0", name)));
            }
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }

    /// Tunables handed to the history engine.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            lookup_page_size: self.limits.lookup_page_size,
        }
    }
}

/// Command-line and environment overrides, applied on top of the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub elastic_url: Option<String>,
    pub chain_node_url: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut GatewayConfig) {
        if let Some(port) = self.port {
            config.http.port = port;
        }
        if let Some(url) = self.elastic_url {
            config.elastic.url = url;
        }
        if let Some(url) = self.chain_node_url {
            config.chain_node.url = Some(url);
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 8888)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8888,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticConfig {
    /// Base URL, e.g. `http://127.0.0.1:9200`
    pub url: String,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:9200".to_string(),
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(2),
        }
    }
}

/// Chain node configuration. Backfill is off while `url` is unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainNodeConfig {
    pub url: Option<String>,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ChainNodeConfig {
    fn default() -> Self {
        Self {
            url: None,
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Request limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max request body size in bytes (default: 1MB)
    pub max_request_size: usize,
    /// Page size of each per-shard account search
    pub lookup_page_size: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: 1024 * 1024, // 1MB
            lookup_page_size: ServiceConfig::default().lookup_page_size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upper bound for a whole history request
    #[serde(with = "humantime_serde")]
    pub request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(30),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable CORS
    pub enabled: bool,
    /// Allowed origins ("*" for all)
    pub allowed_origins: Vec<String>,
    pub allowed_headers: Vec<String>,
    /// Max age for preflight cache
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            allowed_headers: vec!["Content-Type".to_string()],
            max_age: 86400, // 24 hours
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("cannot read configuration: {0}")]
    Io(String),
    /// Configuration file is not valid JSON for `GatewayConfig`
    #[error("cannot parse configuration: {0}")]
    Parse(String),
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Durations written as `"10s"`, `"500ms"`, `"2m"` or plain seconds.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // "ms" first, it also ends in 's'
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(|_| "invalid minutes")
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http_addr().port(), 8888);
        assert!(config.chain_node.url.is_none());
        assert_eq!(config.service_config().lookup_page_size, 1000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = GatewayConfig::from_json(
            r#"{"elastic": {"url": "http://es:9200", "request_timeout": "500ms"},
                "chain_node": {"url": "http://nodeos:8888"}}"#,
        )
        .unwrap();

        assert_eq!(config.elastic.url, "http://es:9200");
        assert_eq!(config.elastic.request_timeout, Duration::from_millis(500));
        assert_eq!(config.elastic.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.chain_node.url.as_deref(), Some("http://nodeos:8888"));
        assert_eq!(config.timeouts.request, Duration::from_secs(30));
    }

    #[test]
    fn test_empty_elastic_url_rejected() {
        let mut config = GatewayConfig::default();
        config.elastic.url = " ".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_chain_node_url_rejected() {
        let mut config = GatewayConfig::default();
        config.chain_node.url = Some(String::new());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_limits_rejected() {
        let mut config = GatewayConfig::default();
        config.limits.lookup_page_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLimit(_))));

        let mut config = GatewayConfig::default();
        config.limits.max_request_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLimit(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = GatewayConfig::default();
        config.elastic.connect_timeout = Duration::ZERO;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeout(_))
        ));
    }

    #[test]
    fn test_duration_formats() {
        use humantime_serde::parse_duration;
        assert_eq!(parse_duration("10s"), Ok(Duration::from_secs(10)));
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration(" 7 "), Ok(Duration::from_secs(7)));
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut config =
            GatewayConfig::from_json(r#"{"http": {"port": 9000}, "elastic": {"url": "http://a:9200"}}"#)
                .unwrap();
        ConfigOverrides {
            port: None,
            elastic_url: Some("http://b:9200".into()),
            chain_node_url: Some("http://nodeos:8888".into()),
        }
        .apply(&mut config);

        assert_eq!(config.http.port, 9000);
        assert_eq!(config.elastic.url, "http://b:9200");
        assert_eq!(config.chain_node.url.as_deref(), Some("http://nodeos:8888"));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        assert!(matches!(
            GatewayConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            GatewayConfig::load("/nonexistent/history.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
