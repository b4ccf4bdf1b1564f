//! Global sequence normalization.
//!
//! `receipt.global_sequence` is stored either as a JSON number or as a
//! numeric string depending on which indexer wrote the document. Both forms
//! compare by their unsigned integer value.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Chain-wide, strictly increasing action ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalSequence(pub u64);

impl GlobalSequence {
    /// Read a sequence from a number or a decimal string. Anything else
    /// (negative, fractional, non-numeric) yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(Self),
            Value::String(s) => s.trim().parse().ok().map(Self),
            _ => None,
        }
    }

    /// Read `receipt.global_sequence` of an action stub or trace node.
    pub fn from_receipt_of(doc: &Value) -> Option<Self> {
        doc.get("receipt")
            .and_then(|r| r.get("global_sequence"))
            .and_then(Self::from_value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for GlobalSequence {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for GlobalSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for GlobalSequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

struct SequenceVisitor;

impl<'de> Visitor<'de> for SequenceVisitor {
    type Value = GlobalSequence;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an unsigned integer or a decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(GlobalSequence(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(GlobalSequence)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.trim()
            .parse()
            .map(GlobalSequence)
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for GlobalSequence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SequenceVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_and_string_are_equal() {
        let a = GlobalSequence::from_value(&json!(1234)).unwrap();
        let b = GlobalSequence::from_value(&json!("1234")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert_eq!(GlobalSequence::from_value(&json!("12a")), None);
        assert_eq!(GlobalSequence::from_value(&json!(-1)), None);
        assert_eq!(GlobalSequence::from_value(&json!(1.5)), None);
        assert_eq!(GlobalSequence::from_value(&json!(null)), None);
    }

    #[test]
    fn test_deserialize_both_forms() {
        let a: GlobalSequence = serde_json::from_value(json!("99")).unwrap();
        let b: GlobalSequence = serde_json::from_value(json!(99)).unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_value::<GlobalSequence>(json!(true)).is_err());
    }

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_value(GlobalSequence(7)).unwrap(), json!(7));
    }

    #[test]
    fn test_from_receipt() {
        let doc = json!({"receipt": {"global_sequence": "42"}});
        assert_eq!(GlobalSequence::from_receipt_of(&doc), Some(GlobalSequence(42)));
        assert_eq!(GlobalSequence::from_receipt_of(&json!({})), None);
    }
}
