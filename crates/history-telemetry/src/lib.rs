//! # History Telemetry
//!
//! Structured logging for the history gateway.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use history_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HISTORY_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter directives |
//! | `HISTORY_JSON_LOGS` | `false` (`true` in containers) | JSON instead of pretty output |
//! | `HISTORY_SERVICE_NAME` | `history-gateway` | Service name on every event |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install subscriber: {0}")]
    Subscriber(String),
}
