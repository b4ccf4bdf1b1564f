//! # Adapters Layer
//!
//! In-process implementations of the outbound ports. The HTTP clients for
//! Elasticsearch and the chain node live in the gateway crate.

pub mod memory;

pub use memory::{BackendCall, InMemoryChainNode, InMemorySearch};
