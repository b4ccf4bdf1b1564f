//! # Ports Layer
//!
//! Hexagonal architecture ports for the history engine.
//!
//! - **Driving Ports (Inbound)**: `HistoryApi`, consumed by the HTTP gateway
//! - **Driven Ports (Outbound)**: `SearchBackend` and `ChainNode`, implemented
//!   by the Elasticsearch / chain node clients and the in-memory adapters

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
