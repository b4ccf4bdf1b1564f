//! Adapters for the gateway.
//!
//! HTTP clients implementing the history engine's outbound ports.

pub mod chain_node;
pub mod elastic;
mod http;

pub use chain_node::ChainNodeClient;
pub use elastic::ElasticClient;
