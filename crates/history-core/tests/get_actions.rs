//! # get_actions Across Shards
//!
//! Drives `HistoryService` over the in-memory backend and checks both the
//! returned page and the exact backend traffic.

mod common;

use common::{service_over, two_shard_backend};
use history_core::adapters::{BackendCall, InMemorySearch};
use history_core::{
    Direction, GetActionsParams, GetActionsResult, HistoryApi, HistoryError, SearchQuery,
    SearchRequest, SortOrder,
};
use serde_json::json;
use std::sync::Arc;

// =============================================================================
// TEST HELPERS
// =============================================================================

fn params(pos: Option<i64>, offset: Option<i64>) -> GetActionsParams {
    GetActionsParams {
        account_name: "alice".into(),
        pos,
        offset,
    }
}

fn global_seqs(result: &GetActionsResult) -> Vec<u64> {
    result.actions.iter().map(|a| a.global_action_seq.value()).collect()
}

fn account_seqs(result: &GetActionsResult) -> Vec<u64> {
    result.actions.iter().map(|a| a.account_action_seq).collect()
}

fn searches(calls: &[BackendCall]) -> Vec<Vec<SearchRequest>> {
    calls
        .iter()
        .filter_map(|c| match c {
            BackendCall::MultiSearch(requests) => Some(requests.clone()),
            _ => None,
        })
        .collect()
}

// =============================================================================
// SHARD LOCATION
// =============================================================================

#[tokio::test]
async fn test_window_inside_second_shard_queries_only_that_shard() {
    let backend = Arc::new(two_shard_backend());
    let service = service_over(backend.clone()).await;

    let result = service.get_actions(params(Some(12), Some(2))).await.unwrap();

    assert_eq!(global_seqs(&result), vec![13, 14]);
    assert_eq!(account_seqs(&result), vec![12, 13]);

    let calls = backend.calls();
    assert_eq!(
        &calls[..2],
        &[
            BackendCall::Count("action_traces-0".into()),
            BackendCall::Count("action_traces-1".into()),
        ]
    );
    assert_eq!(
        searches(&calls),
        vec![vec![SearchRequest {
            index: "action_traces-1".into(),
            query: SearchQuery::account_actions("alice"),
            sort: Some(SortOrder::by_global_sequence(Direction::Ascending)),
            from: 2,
            size: 2,
        }]]
    );
}

#[tokio::test]
async fn test_window_spanning_shards_keeps_order() {
    let backend = Arc::new(two_shard_backend());
    let service = service_over(backend.clone()).await;

    let result = service.get_actions(params(Some(8), Some(5))).await.unwrap();

    assert_eq!(global_seqs(&result), vec![9, 10, 11, 12, 13]);
    assert_eq!(account_seqs(&result), vec![8, 9, 10, 11, 12]);

    let requests = &searches(&backend.calls())[0];
    let slices: Vec<_> = requests.iter().map(|r| (r.index.as_str(), r.from, r.size)).collect();
    assert_eq!(slices, vec![("action_traces-0", 8, 2), ("action_traces-1", 0, 3)]);
}

#[tokio::test]
async fn test_interior_shard_gets_explicit_size() {
    let backend = Arc::new(InMemorySearch::new());
    let mut seq = 0u64;
    for (shard, n) in [("action_traces-0", 3u64), ("action_traces-1", 12), ("action_traces-2", 3)] {
        for _ in 0..n {
            seq += 1;
            backend.insert(shard, &format!("a{}", seq), common::alice_action(seq));
            backend.insert("transaction_traces-0", &format!("t{}", seq), common::trace_for(seq));
        }
    }
    let service = service_over(backend.clone()).await;

    let result = service.get_actions(params(Some(1), Some(16))).await.unwrap();

    assert_eq!(global_seqs(&result), (2..=17).collect::<Vec<_>>());
    let requests = &searches(&backend.calls())[0];
    assert_eq!(requests[1].index, "action_traces-1");
    assert_eq!((requests[1].from, requests[1].size), (0, 12));
}

// =============================================================================
// DIRECTION AND NUMBERING
// =============================================================================

#[tokio::test]
async fn test_descending_tail_equals_reversed_ascending() {
    let backend = Arc::new(two_shard_backend());
    let service = service_over(backend.clone()).await;

    let descending = service.get_actions(params(Some(-1), Some(-5))).await.unwrap();
    let ascending = service.get_actions(params(Some(10), Some(5))).await.unwrap();

    assert_eq!(global_seqs(&descending), vec![15, 14, 13, 12, 11]);
    assert_eq!(account_seqs(&descending), vec![14, 13, 12, 11, 10]);

    let mut reversed = ascending.actions.clone();
    reversed.reverse();
    assert_eq!(descending.actions, reversed);
}

#[tokio::test]
async fn test_descending_queries_newest_shard_first() {
    let backend = Arc::new(two_shard_backend());
    let service = service_over(backend.clone()).await;

    service.get_actions(params(Some(-1), Some(-7))).await.unwrap();

    let calls = backend.calls();
    assert_eq!(calls[0], BackendCall::Count("action_traces-1".into()));
    let requests = &searches(&calls)[0];
    let slices: Vec<_> = requests
        .iter()
        .map(|r| (r.index.as_str(), r.from, r.size, r.sort.as_ref().map(|s| s.direction)))
        .collect();
    assert_eq!(
        slices,
        vec![
            ("action_traces-1", 0, 5, Some(Direction::Descending)),
            ("action_traces-0", 0, 2, Some(Direction::Descending)),
        ]
    );
}

#[tokio::test]
async fn test_defaults_return_newest_page() {
    let backend = Arc::new(two_shard_backend());
    let service = service_over(backend).await;

    let result = service.get_actions(params(None, None)).await.unwrap();

    // Default page is 20, only 15 exist.
    assert_eq!(global_seqs(&result), (1..=15).rev().collect::<Vec<_>>());
    assert_eq!(account_seqs(&result), (0..15).rev().collect::<Vec<_>>());
}

#[tokio::test]
async fn test_backward_offset_from_positive_pos() {
    let backend = Arc::new(two_shard_backend());
    let service = service_over(backend).await;

    let result = service.get_actions(params(Some(3), Some(-5))).await.unwrap();

    assert_eq!(account_seqs(&result), vec![0, 1, 2]);
}

// =============================================================================
// EMPTY PAGES
// =============================================================================

#[tokio::test]
async fn test_empty_window_issues_no_backend_query() {
    let backend = Arc::new(two_shard_backend());
    let service = service_over(backend.clone()).await;

    for (pos, offset) in [(5, 0), (-1, 0), (-1, 5), (0, -5)] {
        let result = service.get_actions(params(Some(pos), Some(offset))).await.unwrap();
        assert!(result.actions.is_empty(), "pos={} offset={}", pos, offset);
    }
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_start_beyond_total_only_counts() {
    let backend = Arc::new(two_shard_backend());
    let service = service_over(backend.clone()).await;

    let result = service.get_actions(params(Some(100), Some(10))).await.unwrap();

    assert!(result.actions.is_empty());
    assert!(backend
        .calls()
        .iter()
        .all(|c| matches!(c, BackendCall::Count(_))));
}

#[tokio::test]
async fn test_unknown_account_is_empty() {
    let backend = Arc::new(two_shard_backend());
    let service = service_over(backend).await;

    let result = service
        .get_actions(GetActionsParams {
            account_name: "carol".into(),
            pos: None,
            offset: None,
        })
        .await
        .unwrap();

    assert!(result.actions.is_empty());
}

// =============================================================================
// TRACE RESOLUTION
// =============================================================================

#[tokio::test]
async fn test_action_trace_is_the_matching_node_with_subtree() {
    let backend = Arc::new(two_shard_backend());
    let service = service_over(backend).await;

    let result = service.get_actions(params(Some(4), Some(1))).await.unwrap();
    let action = &result.actions[0];

    // Sequence 5 is stored as a string in the stub.
    assert_eq!(action.global_action_seq.value(), 5);
    assert_eq!(action.block_num, json!(5));
    assert_eq!(action.action_trace["act"]["name"], "transfer");
    assert_eq!(action.action_trace["inline_traces"][0]["act"]["name"], "notify");
}

#[tokio::test]
async fn test_unreconcilable_stub_fails_the_request() {
    let backend = Arc::new(two_shard_backend());
    backend.insert(
        "transaction_traces-0",
        "t3",
        json!({"id": "t3", "action_traces": [{"receipt": {"global_sequence": 999}}]}),
    );
    let service = service_over(backend).await;

    let err = service.get_actions(params(Some(2), Some(1))).await.unwrap_err();

    assert!(matches!(err, HistoryError::Integrity(_)), "{:?}", err);
}

#[tokio::test]
async fn test_missing_trace_document_fails_the_request() {
    let backend = Arc::new(InMemorySearch::new());
    backend.insert("action_traces-0", "a1", common::alice_action(1));
    backend.create_index("transaction_traces-0");
    let service = service_over(backend).await;

    let err = service.get_actions(params(None, None)).await.unwrap_err();

    assert!(matches!(err, HistoryError::Integrity(_)));
}

#[tokio::test]
async fn test_trace_found_in_later_shard() {
    let backend = Arc::new(InMemorySearch::new());
    backend.insert("action_traces-0", "a2", common::alice_action(2));
    backend.create_index("transaction_traces-0");
    backend.insert("transaction_traces-1", "t2", common::trace_for(2));
    let service = service_over(backend).await;

    let result = service.get_actions(params(None, None)).await.unwrap();

    assert_eq!(global_seqs(&result), vec![2]);
}

// =============================================================================
// BACKEND FAILURES
// =============================================================================

#[tokio::test]
async fn test_failing_count_treats_shard_as_empty() {
    let backend = Arc::new(two_shard_backend());
    let service = service_over(backend.clone()).await;
    backend.fail_index("action_traces-1");

    let result = service.get_actions(params(Some(0), Some(20))).await.unwrap();

    assert_eq!(global_seqs(&result), (1..=10).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_unreachable_backend_is_retryable() {
    let backend = Arc::new(two_shard_backend());
    let service = service_over(backend.clone()).await;
    backend.set_unreachable(true);

    let err = service.get_actions(params(None, None)).await.unwrap_err();

    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_empty_account_name_rejected() {
    let backend = Arc::new(two_shard_backend());
    let service = service_over(backend.clone()).await;

    let err = service
        .get_actions(GetActionsParams {
            account_name: String::new(),
            pos: None,
            offset: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, HistoryError::InvalidParams(_)));
    assert!(backend.calls().is_empty());
}
