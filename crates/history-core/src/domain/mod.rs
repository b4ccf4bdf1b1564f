//! # Domain Layer
//!
//! Pure history logic: shard catalog, pagination arithmetic, shard location,
//! action-trace trees and document shaping.
//!
//! ## Hexagonal Architecture
//!
//! This module contains NO I/O dependencies. Search engine and chain node
//! access is abstracted through the `ports` module.

pub mod catalog;
pub mod documents;
pub mod errors;
pub mod locator;
pub mod pagination;
pub mod sequence;
pub mod trace_tree;

pub use catalog::*;
pub use documents::*;
pub use errors::*;
pub use locator::*;
pub use pagination::*;
pub use sequence::*;
pub use trace_tree::*;
