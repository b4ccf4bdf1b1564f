//! Cross-shard executor and action trace resolver for `get_actions`.

use super::HistoryService;
use crate::domain::{
    locate, ActionRecord, ActionStub, GetActionsResult, GlobalSequence, HistoryError,
    HistoryResult, IndexPrefix, PageWindow, ShardCount, ShardIndex, ShardPlan, TransactionTrace,
};
use crate::ports::{
    DocRef, FetchedDoc, GetActionsParams, SearchQuery, SearchRequest, ShardResponse, SortOrder,
};
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// A stub together with its position inside the window.
struct PlacedStub {
    window_index: u64,
    stub: ActionStub,
}

impl HistoryService {
    #[instrument(skip(self, params), fields(account = %params.account_name))]
    pub(crate) async fn fetch_actions(
        &self,
        params: GetActionsParams,
    ) -> HistoryResult<GetActionsResult> {
        params.validate()?;

        let window = PageWindow::plan_with_defaults(params.pos, params.offset);
        if window.is_empty() {
            debug!("Empty window, no backend query");
            return Ok(GetActionsResult::default());
        }

        let shards = self
            .catalog
            .shards_in(IndexPrefix::ActionTraces, window.direction);
        if shards.is_empty() {
            return Ok(GetActionsResult::default());
        }

        let query = SearchQuery::account_actions(&params.account_name);
        let counts = self.count_shards(&shards, &query).await?;
        let plan = locate(&counts, &window);
        debug!(
            start = window.start,
            count = window.count,
            total = plan.total,
            shards = plan.slices.len(),
            "Shard plan ready"
        );
        if plan.is_empty() {
            return Ok(GetActionsResult::default());
        }

        let requests: Vec<SearchRequest> = plan
            .slices
            .iter()
            .map(|slice| SearchRequest {
                index: slice.index.clone(),
                query: query.clone(),
                sort: Some(SortOrder::by_global_sequence(window.direction)),
                from: slice.skip,
                size: slice.limit,
            })
            .collect();
        let responses = self.backend.multi_search(&requests).await?;
        let stubs = merge_responses(&plan, responses)?;

        let mut actions = Vec::with_capacity(stubs.len());
        for placed in stubs {
            let account_action_seq = window
                .account_action_seq(placed.window_index, plan.total)
                .ok_or_else(|| {
                    HistoryError::integrity("shard returned more actions than it counted")
                })?;
            let action_trace = self
                .resolve_action_trace(&placed.stub.trx_id, placed.stub.global_sequence)
                .await?;

            actions.push(ActionRecord {
                global_action_seq: placed.stub.global_sequence,
                account_action_seq,
                block_num: placed.stub.block_num,
                block_time: placed.stub.block_time,
                action_trace,
            });
        }

        Ok(GetActionsResult { actions })
    }

    /// Matching action count per shard, sequentially, in the given order.
    async fn count_shards(
        &self,
        shards: &[&ShardIndex],
        query: &SearchQuery,
    ) -> HistoryResult<Vec<ShardCount>> {
        let mut counts = Vec::with_capacity(shards.len());
        for shard in shards {
            let count = match self.backend.count(&shard.name, query).await {
                Ok(count) => count,
                Err(e) if !e.is_transport() => {
                    warn!(index = %shard.name, error = %e, "Count failed, treating shard as empty");
                    0
                }
                Err(e) => return Err(e.into()),
            };
            counts.push(ShardCount::new(shard.name.clone(), count));
        }
        Ok(counts)
    }

    /// Full action-trace node for `(trx_id, sequence)`.
    ///
    /// The trace document is taken from the first `transaction_traces` shard
    /// that has it.
    pub(crate) async fn resolve_action_trace(
        &self,
        trx_id: &str,
        sequence: GlobalSequence,
    ) -> HistoryResult<Value> {
        let refs: Vec<DocRef> = self
            .catalog
            .shards(IndexPrefix::TransactionTraces)
            .iter()
            .map(|shard| DocRef::new(shard.name.clone(), trx_id))
            .collect();
        if refs.is_empty() {
            return Err(HistoryError::integrity(format!(
                "no transaction_traces shards to resolve {}",
                trx_id
            )));
        }

        let docs = self.backend.multi_get(&refs).await?;
        let source = docs
            .iter()
            .find_map(FetchedDoc::usable_source)
            .ok_or_else(|| {
                HistoryError::integrity(format!("transaction trace {} not found", trx_id))
            })?;
        let trace = TransactionTrace::from_value(source).ok_or_else(|| {
            HistoryError::integrity(format!("unparseable transaction trace {}", trx_id))
        })?;
        let node = trace.find_action(sequence).ok_or_else(|| {
            HistoryError::integrity(format!(
                "action {} not found in transaction trace {}",
                sequence, trx_id
            ))
        })?;

        Ok(node.to_value())
    }
}

/// Concatenate per-shard hits in plan order, keeping each hit's window index.
///
/// A failed shard contributes nothing; the actions after it keep their
/// positions. A shard never contributes more than its planned limit.
fn merge_responses(
    plan: &ShardPlan,
    responses: Vec<ShardResponse>,
) -> HistoryResult<Vec<PlacedStub>> {
    let mut merged = Vec::new();
    let mut base = 0u64;

    for (slice, response) in plan.slices.iter().zip(responses) {
        if let Some(reason) = &response.error {
            warn!(index = %slice.index, error = %reason, "Shard search failed, skipping");
        } else {
            for (i, hit) in response.hits.iter().take(slice.limit as usize).enumerate() {
                merged.push(PlacedStub {
                    window_index: base + i as u64,
                    stub: ActionStub::from_source(&hit.source)?,
                });
            }
        }
        base += slice.limit;
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ShardSlice;
    use crate::ports::SearchHit;
    use serde_json::json;

    fn hit(seq: u64) -> SearchHit {
        SearchHit {
            index: "action_traces-0".into(),
            id: format!("a{}", seq),
            source: json!({"trx_id": format!("t{}", seq), "receipt": {"global_sequence": seq}}),
        }
    }

    fn plan(limits: &[u64]) -> ShardPlan {
        ShardPlan {
            slices: limits
                .iter()
                .enumerate()
                .map(|(i, limit)| ShardSlice {
                    index: format!("action_traces-{}", i),
                    skip: 0,
                    limit: *limit,
                })
                .collect(),
            total: limits.iter().sum(),
        }
    }

    #[test]
    fn test_failed_shard_keeps_later_positions() {
        let responses = vec![
            ShardResponse::with_hits(vec![hit(1), hit(2)]),
            ShardResponse::failed("shard down"),
            ShardResponse::with_hits(vec![hit(6)]),
        ];
        let merged = merge_responses(&plan(&[2, 3, 1]), responses).unwrap();

        let placed: Vec<_> = merged
            .iter()
            .map(|p| (p.window_index, p.stub.global_sequence.value()))
            .collect();
        assert_eq!(placed, vec![(0, 1), (1, 2), (5, 6)]);
    }

    #[test]
    fn test_shard_never_exceeds_its_limit() {
        let responses = vec![ShardResponse::with_hits(vec![hit(1), hit(2), hit(3)])];
        let merged = merge_responses(&plan(&[2]), responses).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_malformed_stub_is_integrity_error() {
        let bad = SearchHit {
            index: "action_traces-0".into(),
            id: "x".into(),
            source: json!({"receipt": {}}),
        };
        let result = merge_responses(&plan(&[1]), vec![ShardResponse::with_hits(vec![bad])]);
        assert!(matches!(result, Err(HistoryError::Integrity(_))));
    }
}
