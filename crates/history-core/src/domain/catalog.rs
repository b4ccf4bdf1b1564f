//! # Index Catalog
//!
//! Groups the physical shard indices of the search engine by logical prefix.
//! A shard is named `<prefix>-<shard_id>`; ascending shard id is
//! chronological order.

use crate::domain::pagination::Direction;
use std::collections::BTreeMap;
use std::fmt;

/// Logical index families the history API reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexPrefix {
    Accounts,
    Transactions,
    TransactionTraces,
    ActionTraces,
}

impl IndexPrefix {
    /// Every prefix the history API serves.
    pub const ALL: [IndexPrefix; 4] = [
        IndexPrefix::Accounts,
        IndexPrefix::Transactions,
        IndexPrefix::TransactionTraces,
        IndexPrefix::ActionTraces,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accounts => "accounts",
            Self::Transactions => "transactions",
            Self::TransactionTraces => "transaction_traces",
            Self::ActionTraces => "action_traces",
        }
    }

    /// Parse the shard id out of `<prefix>-<digits>`.
    ///
    /// Returns `None` for names of other prefixes and for suffixes that are
    /// not purely decimal (`action_traces-old`, `action_traces-1-reindex`).
    pub fn shard_id(&self, index_name: &str) -> Option<u64> {
        let suffix = index_name
            .strip_prefix(self.as_str())?
            .strip_prefix('-')?;
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        suffix.parse().ok()
    }
}

impl fmt::Display for IndexPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One physical shard index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardIndex {
    pub name: String,
    pub shard_id: u64,
}

/// Immutable mapping prefix → shards sorted ascending by shard id.
///
/// Built once at startup and shared read-only by every request. Newly created
/// shards stay invisible until the process restarts.
#[derive(Debug, Clone, Default)]
pub struct IndexCatalog {
    shards: BTreeMap<IndexPrefix, Vec<ShardIndex>>,
}

impl IndexCatalog {
    /// Catalog with no shards; every query against it yields "no data".
    pub fn empty() -> Self {
        Self::default()
    }

    /// Group a raw index listing by the requested prefixes.
    pub fn from_index_names<I, S>(names: I, prefixes: &[IndexPrefix]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut shards: BTreeMap<IndexPrefix, Vec<ShardIndex>> = BTreeMap::new();

        for name in names {
            let name = name.as_ref().trim();
            for prefix in prefixes {
                if let Some(shard_id) = prefix.shard_id(name) {
                    shards.entry(*prefix).or_default().push(ShardIndex {
                        name: name.to_string(),
                        shard_id,
                    });
                }
            }
        }

        for list in shards.values_mut() {
            list.sort_by(|a, b| a.shard_id.cmp(&b.shard_id).then_with(|| a.name.cmp(&b.name)));
            list.dedup_by(|a, b| a.name == b.name);
        }

        Self { shards }
    }

    /// Shards of a prefix in chronological order.
    pub fn shards(&self, prefix: IndexPrefix) -> &[ShardIndex] {
        self.shards.get(&prefix).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Shards of a prefix in the iteration order of `direction`
    /// (newest first when descending).
    pub fn shards_in(&self, prefix: IndexPrefix, direction: Direction) -> Vec<&ShardIndex> {
        let shards = self.shards(prefix);
        match direction {
            Direction::Ascending => shards.iter().collect(),
            Direction::Descending => shards.iter().rev().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shards.values().all(Vec::is_empty)
    }

    /// Shard count per prefix, for health reporting.
    pub fn summary(&self) -> BTreeMap<&'static str, usize> {
        IndexPrefix::ALL
            .iter()
            .map(|p| (p.as_str(), self.shards(*p).len()))
            .collect()
    }
}
