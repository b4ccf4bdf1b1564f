//! # Shard Locator
//!
//! Maps a virtual window onto concrete shards. Input is the matching count of
//! every shard, already in direction order (oldest first for ascending pages,
//! newest first for descending ones).
//!
//! ```text
//!  virtual index:  0 ........ 9 | 10 ... 14 | 15 ........ 29
//!  shards:         action_traces-0 | action_traces-1 | action_traces-2
//!  window [12, 20):              ^^^^^^^^^  ^^^^^
//!                         entry: skip 2, limit 3 | exit: skip 0, limit 5
//! ```
//!
//! The entry shard is the first whose running total exceeds `start`; the exit
//! shard is the first whose running total reaches `start + count`. Shards in
//! between are taken whole. Empty shards are never queried.

use crate::domain::pagination::PageWindow;

/// Matching document count of one shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardCount {
    pub index: String,
    pub count: u64,
}

impl ShardCount {
    pub fn new(index: impl Into<String>, count: u64) -> Self {
        Self {
            index: index.into(),
            count,
        }
    }
}

/// Local `from`/`size` to query on one shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSlice {
    pub index: String,
    pub skip: u64,
    pub limit: u64,
}

/// Target shards for one window plus the total used for sequence numbering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShardPlan {
    /// Slices in direction order; the merged result follows this order.
    pub slices: Vec<ShardSlice>,
    /// Matching actions across every shard, targeted or not.
    pub total: u64,
}

impl ShardPlan {
    /// Number of items the slices yield when fully applied.
    pub fn planned_items(&self) -> u64 {
        self.slices.iter().map(|s| s.limit).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// Choose shards and per-shard skip/limit for `window`.
///
/// The sum of slice limits is exactly `min(count, total - start)`, or 0 when
/// `start >= total`.
pub fn locate(counts: &[ShardCount], window: &PageWindow) -> ShardPlan {
    let total = counts.iter().map(|c| c.count).sum();
    let mut slices = Vec::new();

    if window.is_empty() {
        return ShardPlan { slices, total };
    }

    let start = window.start;
    let end = window.end();
    let mut before = 0u64;

    for shard in counts {
        if before >= end {
            break;
        }
        let after = before.saturating_add(shard.count);
        if shard.count > 0 && after > start {
            let lo = start.max(before);
            let hi = end.min(after);
            slices.push(ShardSlice {
                index: shard.index.clone(),
                skip: lo - before,
                limit: hi - lo,
            });
        }
        before = after;
    }

    ShardPlan { slices, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pagination::Direction;
    use proptest::prelude::*;

    fn window(start: u64, count: u64) -> PageWindow {
        PageWindow {
            direction: Direction::Ascending,
            start,
            count,
        }
    }

    fn slice(index: &str, skip: u64, limit: u64) -> ShardSlice {
        ShardSlice {
            index: index.to_string(),
            skip,
            limit,
        }
    }

    fn two_shards() -> Vec<ShardCount> {
        vec![
            ShardCount::new("action_traces-0", 10),
            ShardCount::new("action_traces-1", 5),
        ]
    }

    #[test]
    fn test_window_inside_second_shard() {
        let plan = locate(&two_shards(), &PageWindow::plan(12, 2));
        assert_eq!(plan.slices, vec![slice("action_traces-1", 2, 2)]);
        assert_eq!(plan.total, 15);
    }

    #[test]
    fn test_window_spanning_entry_interior_exit() {
        let counts = vec![
            ShardCount::new("a-0", 10),
            ShardCount::new("a-1", 4),
            ShardCount::new("a-2", 10),
        ];
        let plan = locate(&counts, &window(8, 10));
        assert_eq!(
            plan.slices,
            vec![slice("a-0", 8, 2), slice("a-1", 0, 4), slice("a-2", 0, 4)]
        );
        assert_eq!(plan.planned_items(), 10);
    }

    #[test]
    fn test_start_beyond_total() {
        let plan = locate(&two_shards(), &window(15, 5));
        assert!(plan.is_empty());
        assert_eq!(plan.total, 15);
    }

    #[test]
    fn test_window_truncated_by_data() {
        let plan = locate(&two_shards(), &window(13, 10));
        assert_eq!(plan.slices, vec![slice("action_traces-1", 3, 2)]);
    }

    #[test]
    fn test_empty_shards_are_skipped() {
        let counts = vec![
            ShardCount::new("a-0", 0),
            ShardCount::new("a-1", 3),
            ShardCount::new("a-2", 0),
            ShardCount::new("a-3", 3),
        ];
        let plan = locate(&counts, &window(0, 6));
        assert_eq!(plan.slices, vec![slice("a-1", 0, 3), slice("a-3", 0, 3)]);
    }

    #[test]
    fn test_boundary_exactly_at_shard_edge() {
        let plan = locate(&two_shards(), &window(10, 5));
        assert_eq!(plan.slices, vec![slice("action_traces-1", 0, 5)]);

        let plan = locate(&two_shards(), &window(0, 10));
        assert_eq!(plan.slices, vec![slice("action_traces-0", 0, 10)]);
    }

    #[test]
    fn test_empty_window_targets_nothing() {
        let plan = locate(&two_shards(), &window(3, 0));
        assert!(plan.is_empty());
    }

    /// Reference model: materialize the virtual index and cut the window out.
    fn model(counts: &[u64], start: u64, count: u64) -> Vec<(usize, u64)> {
        let all: Vec<(usize, u64)> = counts
            .iter()
            .enumerate()
            .flat_map(|(shard, &c)| (0..c).map(move |local| (shard, local)))
            .collect();
        all.into_iter()
            .skip(start as usize)
            .take(count as usize)
            .collect()
    }

    proptest! {
        #[test]
        fn prop_slices_match_model(
            counts in proptest::collection::vec(0u64..20, 0..8),
            start in 0u64..120,
            count in 0u64..60,
        ) {
            let shard_counts: Vec<ShardCount> = counts
                .iter()
                .enumerate()
                .map(|(i, c)| ShardCount::new(format!("s-{}", i), *c))
                .collect();
            let plan = locate(&shard_counts, &window(start, count));

            let applied: Vec<(usize, u64)> = plan
                .slices
                .iter()
                .flat_map(|s| {
                    let shard: usize = s.index[2..].parse().unwrap();
                    (s.skip..s.skip + s.limit).map(move |local| (shard, local))
                })
                .collect();

            let total: u64 = counts.iter().sum();
            prop_assert_eq!(plan.total, total);
            prop_assert_eq!(plan.planned_items(), count.min(total.saturating_sub(start)));
            prop_assert_eq!(applied, model(&counts, start, count));
            prop_assert!(plan.slices.iter().all(|s| s.limit > 0));
        }
    }
}
