//! Transaction assembler and chain backfill for `get_transaction`.

use super::HistoryService;
use crate::domain::{
    assemble_transaction, tag_block_transaction, GetTransactionResult, HistoryError,
    HistoryResult, IndexPrefix, TransactionTrace,
};
use crate::ports::{ChainNode, DocRef, FetchedDoc, GetTransactionParams};
use tracing::{debug, instrument, warn};

impl HistoryService {
    #[instrument(skip(self, params), fields(id = %params.id))]
    pub(crate) async fn fetch_transaction(
        &self,
        params: GetTransactionParams,
    ) -> HistoryResult<GetTransactionResult> {
        params.validate()?;
        let id = params.id.as_str();

        let transaction_refs = refs_for(self, IndexPrefix::Transactions, id);
        let trace_refs = refs_for(self, IndexPrefix::TransactionTraces, id);
        if transaction_refs.is_empty() || trace_refs.is_empty() {
            return Err(HistoryError::not_found(format!("transaction {}", id)));
        }

        let split = transaction_refs.len();
        let refs: Vec<DocRef> = transaction_refs.into_iter().chain(trace_refs).collect();
        let docs = self.backend.multi_get(&refs).await?;

        let transaction = first_usable(docs.iter().take(split));
        let trace = first_usable(docs.iter().skip(split));
        let (Some(transaction), Some(trace)) = (transaction, trace) else {
            return Err(HistoryError::not_found(format!("transaction {}", id)));
        };

        let trace = TransactionTrace::from_value(trace).ok_or_else(|| {
            HistoryError::integrity(format!("unparseable transaction trace {}", id))
        })?;
        let mut record = assemble_transaction(id, transaction, &trace)?;

        if let Some(chain) = &self.chain {
            backfill_packed_trx(chain.as_ref(), &mut record, params.block_num_hint).await;
        }

        Ok(record)
    }
}

fn refs_for(service: &HistoryService, prefix: IndexPrefix, id: &str) -> Vec<DocRef> {
    service
        .catalog
        .shards(prefix)
        .iter()
        .map(|shard| DocRef::new(shard.name.clone(), id))
        .collect()
}

fn first_usable<'a>(mut docs: impl Iterator<Item = &'a FetchedDoc>) -> Option<&'a serde_json::Value> {
    docs.find_map(FetchedDoc::usable_source)
}

/// Recover the packed transaction from its block. Every failure leaves
/// `record` as it was.
async fn backfill_packed_trx(
    chain: &dyn ChainNode,
    record: &mut GetTransactionResult,
    block_num_hint: Option<u64>,
) {
    let Some(block_num) = record.block_num_u64().or(block_num_hint) else {
        warn!(id = %record.id, "No block number to backfill from");
        return;
    };

    let block = match chain.get_block(block_num).await {
        Ok(block) => block,
        Err(e) => {
            warn!(id = %record.id, block_num, error = %e, "Chain node backfill failed");
            return;
        }
    };

    let tagged = block
        .transactions
        .iter()
        .find_map(|entry| tag_block_transaction(&entry.trx, &record.id));
    match tagged {
        Some(tagged) => {
            if record.splice_packed_trx(tagged) {
                debug!(id = %record.id, block_num, "Packed transaction backfilled");
            } else {
                warn!(id = %record.id, "Trace receipt is not an object, backfill skipped");
            }
        }
        None => warn!(id = %record.id, block_num, "Transaction absent from its block"),
    }
}
