//! Shared fixtures for the history-core integration tests.

#![allow(dead_code)]

use history_core::adapters::{InMemoryChainNode, InMemorySearch};
use history_core::HistoryService;
use serde_json::{json, Value};
use std::sync::Arc;

/// Action stub of `alice` with global sequence `seq`. Odd sequences are
/// stored as strings, the way some indexer versions write them.
pub fn alice_action(seq: u64) -> Value {
    let encoded = if seq % 2 == 1 {
        json!(seq.to_string())
    } else {
        json!(seq)
    };
    json!({
        "trx_id": format!("t{}", seq),
        "block_num": seq,
        "block_time": format!("2018-06-{:02}T00:00:00.000", seq),
        "receipt": {"receiver": "alice", "global_sequence": encoded},
        "act": {"account": "eosio.token", "name": "transfer",
                "authorization": [{"actor": "alice", "permission": "active"}]},
    })
}

/// Trace of transaction `t<seq>`: an unrelated root action first, then the
/// action itself with one inline notification.
pub fn trace_for(seq: u64) -> Value {
    json!({
        "id": format!("t{}", seq),
        "block_num": seq,
        "block_time": format!("2018-06-{:02}T00:00:00.000", seq),
        "receipt": {"status": "executed", "cpu_usage_us": 100},
        "action_traces": [
            {"receipt": {"global_sequence": seq + 500}, "act": {"name": "onblock"}, "inline_traces": []},
            {
                "receipt": {"global_sequence": seq},
                "act": {"name": "transfer"},
                "inline_traces": [
                    {"receipt": {"global_sequence": seq + 1000}, "act": {"name": "notify"}, "inline_traces": []}
                ]
            }
        ]
    })
}

/// `action_traces-0` holds alice's actions 1..=10, `action_traces-1` holds
/// 11..=15. Both also hold actions of bob that must never match.
pub fn two_shard_backend() -> InMemorySearch {
    let backend = InMemorySearch::new();
    for seq in 1..=15u64 {
        let shard = if seq <= 10 { "action_traces-0" } else { "action_traces-1" };
        backend.insert(shard, &format!("a{}", seq), alice_action(seq));
        backend.insert("transaction_traces-0", &format!("t{}", seq), trace_for(seq));
    }
    for (shard, seq) in [("action_traces-0", 200u64), ("action_traces-1", 201)] {
        backend.insert(
            shard,
            &format!("b{}", seq),
            json!({
                "trx_id": "tb",
                "receipt": {"receiver": "bob", "global_sequence": seq},
                "act": {"authorization": [{"actor": "bob"}]},
            }),
        );
    }
    backend
}

/// Service over `backend` with its catalog discovered; the discovery call is
/// cleared from the call log.
pub async fn service_over(backend: Arc<InMemorySearch>) -> HistoryService {
    let service = HistoryService::discover(backend.clone()).await;
    backend.clear_calls();
    service
}

pub async fn service_with_chain(
    backend: Arc<InMemorySearch>,
    chain: Arc<InMemoryChainNode>,
) -> HistoryService {
    service_over(backend).await.with_chain_node(chain)
}
