//! # History Core
//!
//! The read-only history engine behind `/v1/history/*`. Actions, transactions
//! and accounts live in a search engine as time-sharded indices
//! (`action_traces-0`, `action_traces-1`, ...). This crate turns a request into
//! the smallest set of backend queries that answers it, and stitches the
//! per-shard answers back into one globally ordered result.
//!
//! ## Request Flow (get_actions)
//!
//! ```text
//!  pos/offset ──→ [PageWindow::plan] ──→ virtual window [start, start+count)
//!                                              │
//!           per-shard _count (sequential) ──→ [locate] ──→ ShardPlan (skip/limit per shard)
//!                                              │
//!                               one _msearch ──→ merge in direction order, truncate, number
//!                                              │
//!                    one _mget per action stub ──→ [TransactionTrace::find_action] (BFS)
//!                                              │
//!                                              ↓
//!                                      GetActionsResult
//! ```
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): catalog, planner, locator, trace tree, documents. No I/O.
//! - **Ports Layer** (`ports/`): `HistoryApi` (inbound), `SearchBackend` / `ChainNode` (outbound)
//! - **Service Layer** (`service/`): `HistoryService`, the port-driven orchestration
//! - **Adapters Layer** (`adapters/`): in-memory backend and chain node
//!
//! ## Invariants
//!
//! | Invariant | Enforcement | Location |
//! |-----------|-------------|----------|
//! | Window never negative | clamp at 0 | pagination.rs |
//! | Slices yield exactly `min(count, total - start)` items | overlap walk | locator.rs |
//! | Results ordered by direction-aware shard order | slice order == request order | service/actions.rs |
//! | Sequence compared by value, not JSON type | `GlobalSequence` | sequence.rs |
//! | Trace search is breadth-first, children appended at the back | `VecDeque` | trace_tree.rs |

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    locate, ActionRecord, ActionTraceNode, Direction, GetActionsResult,
    GetControlledAccountsResult, GetKeyAccountsResult, GetTransactionResult, GlobalSequence,
    HistoryError, HistoryResult, IndexCatalog, IndexPrefix, PageWindow, ShardCount, ShardIndex,
    ShardPlan, ShardSlice, TransactionTrace, DEFAULT_OFFSET, DEFAULT_POS,
};

pub use ports::{
    BackendError, BlockTransaction, ChainBlock, ChainNode, DocRef, FetchedDoc, GetActionsParams,
    GetControlledAccountsParams, GetKeyAccountsParams, GetTransactionParams, HistoryApi,
    SearchBackend, SearchHit, SearchQuery, SearchRequest, ShardResponse, SortOrder,
};

pub use service::{HistoryService, ServiceConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
