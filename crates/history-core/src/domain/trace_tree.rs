//! # Action Trace Tree
//!
//! A transaction trace document holds its root actions in `action_traces`;
//! each action may spawn inline actions in `inline_traces`, to any depth.
//! The tree is parsed into owned nodes and searched breadth-first with an
//! explicit queue, so depth never grows the call stack.

use crate::domain::sequence::GlobalSequence;
use serde_json::{Map, Value};
use std::collections::VecDeque;

const INLINE_TRACES: &str = "inline_traces";

/// One action-trace node with its children split out.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionTraceNode {
    /// Every field of the node except `inline_traces`.
    pub body: Map<String, Value>,
    /// Normalized `receipt.global_sequence`, if readable.
    pub sequence: Option<GlobalSequence>,
    pub inline_traces: Vec<ActionTraceNode>,
}

impl ActionTraceNode {
    /// Parse a node and its whole subtree. Returns `None` when the value (or
    /// any descendant) is not an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut body = object.clone();
        let children = match body.remove(INLINE_TRACES) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(Self::from_value)
                .collect::<Option<Vec<_>>>()?,
            Some(_) => return None,
        };
        let sequence = GlobalSequence::from_receipt_of(value);

        Some(Self {
            body,
            sequence,
            inline_traces: children,
        })
    }

    /// Full JSON of the node, inline traces included.
    pub fn to_value(&self) -> Value {
        let mut object = self.body.clone();
        object.insert(
            INLINE_TRACES.to_string(),
            Value::Array(self.inline_traces.iter().map(Self::to_value).collect()),
        );
        Value::Object(object)
    }
}

/// Parsed `transaction_traces` document.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionTrace {
    pub id: Option<String>,
    pub block_num: Option<Value>,
    pub block_time: Option<Value>,
    pub receipt: Value,
    pub action_traces: Vec<ActionTraceNode>,
}

impl TransactionTrace {
    /// Parse a trace document. `action_traces` must be an array of objects.
    pub fn from_value(doc: &Value) -> Option<Self> {
        let object = doc.as_object()?;
        let roots = match object.get("action_traces") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(ActionTraceNode::from_value)
                .collect::<Option<Vec<_>>>()?,
            Some(_) => return None,
        };

        Some(Self {
            id: object.get("id").and_then(Value::as_str).map(str::to_string),
            block_num: object.get("block_num").cloned(),
            block_time: object.get("block_time").cloned(),
            receipt: object.get("receipt").cloned().unwrap_or(Value::Null),
            action_traces: roots,
        })
    }

    /// Breadth-first search for the node carrying `target`.
    ///
    /// Nodes are visited level by level in document order; a node without a
    /// readable sequence never matches but its children are still visited.
    pub fn find_action(&self, target: GlobalSequence) -> Option<&ActionTraceNode> {
        let mut queue: VecDeque<&ActionTraceNode> = self.action_traces.iter().collect();

        while let Some(node) = queue.pop_front() {
            if node.sequence == Some(target) {
                return Some(node);
            }
            queue.extend(node.inline_traces.iter());
        }

        None
    }

    /// Root action traces as JSON, in order.
    pub fn roots_to_value(&self) -> Value {
        Value::Array(self.action_traces.iter().map(ActionTraceNode::to_value).collect())
    }
}
