//! # Documents
//!
//! Stored document shapes and the response records built from them.
//!
//! Fields the API passes through untouched (`block_num`, `block_time`, account
//! names) stay as raw JSON values so that whatever the indexer wrote is echoed
//! back byte-for-byte in meaning.

use crate::domain::errors::{HistoryError, HistoryResult};
use crate::domain::sequence::GlobalSequence;
use crate::domain::trace_tree::TransactionTrace;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields copied from a transaction document into `trx.trx`, in this order.
pub const TRX_FIELDS: [&str; 11] = [
    "expiration",
    "ref_block_num",
    "ref_block_prefix",
    "max_net_usage_words",
    "max_cpu_usage_ms",
    "delay_sec",
    "context_free_actions",
    "actions",
    "transaction_extensions",
    "signatures",
    "context_free_data",
];

// =============================================================================
// ACTION STUBS
// =============================================================================

/// The part of an `action_traces` hit the executor needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionStub {
    pub trx_id: String,
    pub global_sequence: GlobalSequence,
    pub block_num: Value,
    pub block_time: Value,
}

impl ActionStub {
    /// Read a stub from a search hit source. Requires `trx_id` and a readable
    /// `receipt.global_sequence`.
    pub fn from_source(source: &Value) -> HistoryResult<Self> {
        let trx_id = source
            .get("trx_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| HistoryError::integrity("action stub without trx_id"))?;
        let global_sequence = GlobalSequence::from_receipt_of(source).ok_or_else(|| {
            HistoryError::integrity(format!(
                "action stub of {} without a readable receipt.global_sequence",
                trx_id
            ))
        })?;

        Ok(Self {
            trx_id: trx_id.to_string(),
            global_sequence,
            block_num: source.get("block_num").cloned().unwrap_or(Value::Null),
            block_time: source.get("block_time").cloned().unwrap_or(Value::Null),
        })
    }
}

/// One entry of a `get_actions` page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub global_action_seq: GlobalSequence,
    pub account_action_seq: u64,
    pub block_num: Value,
    pub block_time: Value,
    pub action_trace: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetActionsResult {
    pub actions: Vec<ActionRecord>,
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// `trx` envelope of a transaction record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrxEnvelope {
    pub trx: Value,
    pub receipt: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetTransactionResult {
    pub id: String,
    pub block_time: Value,
    pub block_num: Value,
    pub traces: Value,
    pub trx: TrxEnvelope,
}

impl GetTransactionResult {
    /// `block_num` as a chain-node block selector, if it is a number or a
    /// numeric string.
    pub fn block_num_u64(&self) -> Option<u64> {
        GlobalSequence::from_value(&self.block_num).map(|s| s.value())
    }

    /// Replace `trx.receipt.trx` with the tagged payload recovered from the
    /// chain. Returns `false` (and changes nothing) if the receipt is not an
    /// object.
    pub fn splice_packed_trx(&mut self, tagged: Value) -> bool {
        match self.trx.receipt.as_object_mut() {
            Some(receipt) => {
                receipt.insert("trx".to_string(), tagged);
                true
            }
            None => false,
        }
    }
}

/// Build the allow-listed `trx.trx` object. Missing fields become `null`.
pub fn transaction_body(transaction: &Value) -> Value {
    let body: Map<String, Value> = TRX_FIELDS
        .iter()
        .map(|field| {
            (
                field.to_string(),
                transaction.get(*field).cloned().unwrap_or(Value::Null),
            )
        })
        .collect();
    Value::Object(body)
}

/// Combine a transaction document and its trace into one record.
pub fn assemble_transaction(
    id: &str,
    transaction: &Value,
    trace: &TransactionTrace,
) -> HistoryResult<GetTransactionResult> {
    if !transaction.is_object() {
        return Err(HistoryError::integrity(format!(
            "transaction document {} is not an object",
            id
        )));
    }

    Ok(GetTransactionResult {
        id: id.to_string(),
        block_time: trace.block_time.clone().unwrap_or(Value::Null),
        block_num: transaction.get("block_num").cloned().unwrap_or(Value::Null),
        traces: trace.roots_to_value(),
        trx: TrxEnvelope {
            trx: transaction_body(transaction),
            receipt: trace.receipt.clone(),
        },
    })
}

/// Match one `transactions[].trx` entry of a chain block against `id`.
///
/// A bare id string becomes `[0, "<id>"]`; an object with a matching `id`
/// becomes `[1, {...}]` with the `id` field removed. Anything else is `None`.
pub fn tag_block_transaction(trx: &Value, id: &str) -> Option<Value> {
    match trx {
        Value::String(s) if s == id => Some(Value::Array(vec![Value::from(0), trx.clone()])),
        Value::Object(object) if object.get("id").and_then(Value::as_str) == Some(id) => {
            let mut packed = object.clone();
            packed.remove("id");
            Some(Value::Array(vec![Value::from(1), Value::Object(packed)]))
        }
        _ => None,
    }
}

// =============================================================================
// ACCOUNTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PublicKeyEntry {
    #[serde(default)]
    pub key: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountControl {
    #[serde(default)]
    pub name: Value,
}

/// `accounts` shard document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountDoc {
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub pub_keys: Vec<PublicKeyEntry>,
    #[serde(default)]
    pub account_controls: Vec<AccountControl>,
}

impl AccountDoc {
    pub fn from_source(source: &Value) -> HistoryResult<Self> {
        serde_json::from_value(source.clone())
            .map_err(|e| HistoryError::integrity(format!("unparseable account document: {}", e)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetKeyAccountsResult {
    pub account_names: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetControlledAccountsResult {
    pub controlled_accounts: Vec<Value>,
}
