//! Tower middleware for the gateway.
//!
//! Applied outermost first: CORS, tracing, metrics, timeout, method gate.

pub mod cors;
pub mod method_gate;
pub mod metrics;
pub mod timeout;
pub mod tracing;

pub use cors::create_cors_layer;
pub use method_gate::{MethodGateLayer, MethodGateService};
pub use metrics::{GatewayMetrics, MetricsLayer, MetricsService, RequestTimer};
pub use timeout::{TimeoutLayer, TimeoutService};
pub use self::tracing::{TracingLayer, TracingService};
