//! # Pagination Planner
//!
//! Normalizes a signed `pos`/`offset` pair into an absolute window over the
//! virtual action index of one account.
//!
//! The virtual index is dense and zero-based. Ascending windows count from the
//! oldest matching action; descending windows count from the newest, so index
//! 0 of a descending window is always the most recent action.
//!
//! | pos | offset | window |
//! |-----|--------|--------|
//! | `p >= 0` | `o >= 0` | ascending `[p, p + o)` |
//! | `p >= 0` | `o < 0` | ascending `[p - |o|, p)`, clamped at 0 |
//! | `-1` | `-n` | descending `[0, n)`, the newest `n` actions |
//! | `-k` | `o` | descending, anchored at tail index `k - 1`, `o` negated |

use serde::{Deserialize, Serialize};

/// Default `pos`: anchor at the most recent action.
pub const DEFAULT_POS: i64 = -1;

/// Default `offset`: one page of 20 actions going back in time.
pub const DEFAULT_OFFSET: i64 = -20;

/// Sort direction of a page, in `receipt.global_sequence` terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn is_ascending(&self) -> bool {
        matches!(self, Self::Ascending)
    }
}

/// Absolute window `[start, start + count)` over the virtual action index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub direction: Direction,
    pub start: u64,
    pub count: u64,
}

impl PageWindow {
    /// Plan the window for a `pos`/`offset` request.
    ///
    /// Never fails: every pair maps to a window with `start >= 0` and
    /// `count >= 0`. Arithmetic runs in `i128` so `i64::MIN` inputs cannot
    /// overflow.
    pub fn plan(pos: i64, offset: i64) -> Self {
        let (direction, anchor, offset) = if pos < 0 {
            // Tail space: -1 is the newest action, -2 the one before it.
            let anchor = -(pos as i128) - 1;
            (Direction::Descending, anchor, -(offset as i128))
        } else {
            (Direction::Ascending, pos as i128, offset as i128)
        };

        let (mut start, mut count) = if offset >= 0 {
            (anchor, offset)
        } else {
            (anchor + offset, -offset)
        };

        if start < 0 {
            count += start;
            start = 0;
        }

        Self {
            direction,
            start: clamp_u64(start),
            count: clamp_u64(count.max(0)),
        }
    }

    /// Plan with the protocol defaults applied to missing fields.
    pub fn plan_with_defaults(pos: Option<i64>, offset: Option<i64>) -> Self {
        Self::plan(pos.unwrap_or(DEFAULT_POS), offset.unwrap_or(DEFAULT_OFFSET))
    }

    /// An empty window issues no backend query at all.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Exclusive end of the window, saturating at `u64::MAX`.
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.count)
    }

    /// `account_action_seq` of the `local_index`-th item of the page.
    ///
    /// Ascending: `start + i`. Descending: `total - (start + i + 1)`.
    /// Returns `None` if the item lies beyond `total` (a shard returned more
    /// documents than it counted).
    pub fn account_action_seq(&self, local_index: u64, total: u64) -> Option<u64> {
        let virtual_index = self.start.checked_add(local_index)?;
        match self.direction {
            Direction::Ascending => Some(virtual_index),
            Direction::Descending => total.checked_sub(virtual_index.checked_add(1)?),
        }
    }
}

fn clamp_u64(value: i128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn window(direction: Direction, start: u64, count: u64) -> PageWindow {
        PageWindow {
            direction,
            start,
            count,
        }
    }

    #[test]
    fn test_forward_from_pos() {
        assert_eq!(PageWindow::plan(12, 2), window(Direction::Ascending, 12, 2));
        assert_eq!(PageWindow::plan(0, 10), window(Direction::Ascending, 0, 10));
    }

    #[test]
    fn test_backward_from_pos() {
        assert_eq!(PageWindow::plan(10, -3), window(Direction::Ascending, 7, 3));
    }

    #[test]
    fn test_backward_clamps_at_zero() {
        assert_eq!(PageWindow::plan(2, -5), window(Direction::Ascending, 0, 2));
        assert!(PageWindow::plan(0, -5).is_empty());
    }

    #[test]
    fn test_sentinel_is_newest_first() {
        assert_eq!(PageWindow::plan(-1, -5), window(Direction::Descending, 0, 5));
        assert_eq!(
            PageWindow::plan_with_defaults(None, None),
            window(Direction::Descending, 0, 20)
        );
    }

    #[test]
    fn test_sentinel_with_forward_offset_is_empty() {
        // Nothing is newer than the newest action.
        assert!(PageWindow::plan(-1, 5).is_empty());
    }

    #[test]
    fn test_deeper_tail_anchor() {
        // -3 anchors two actions before the newest; -2 walks further back.
        assert_eq!(PageWindow::plan(-3, -2), window(Direction::Descending, 2, 2));
        // Forward in tail space walks towards the newest, clamped at 0.
        assert_eq!(PageWindow::plan(-3, 4), window(Direction::Descending, 0, 2));
    }

    #[test]
    fn test_zero_offset_is_empty() {
        assert!(PageWindow::plan(5, 0).is_empty());
        assert!(PageWindow::plan(-1, 0).is_empty());
    }

    #[test]
    fn test_account_action_seq_ascending() {
        let w = PageWindow::plan(12, 3);
        let seqs: Vec<_> = (0..3).map(|i| w.account_action_seq(i, 15).unwrap()).collect();
        assert_eq!(seqs, vec![12, 13, 14]);
    }

    #[test]
    fn test_account_action_seq_descending() {
        let w = PageWindow::plan(-1, -5);
        let seqs: Vec<_> = (0..5).map(|i| w.account_action_seq(i, 15).unwrap()).collect();
        assert_eq!(seqs, vec![14, 13, 12, 11, 10]);
        assert_eq!(w.account_action_seq(15, 15), None);
    }

    proptest! {
        #[test]
        fn prop_window_is_never_negative(pos in any::<i64>(), offset in any::<i64>()) {
            let w = PageWindow::plan(pos, offset);
            // u64 fields make negativity unrepresentable; the checks below pin
            // the direction rule and the size bound instead.
            prop_assert_eq!(w.direction.is_ascending(), pos >= 0);
            prop_assert!(u128::from(w.count) <= offset.unsigned_abs() as u128);
        }

        #[test]
        fn prop_ascending_window_matches_reference(pos in 0i64..10_000, offset in -10_000i64..10_000) {
            let w = PageWindow::plan(pos, offset);
            let (lo, hi) = if offset >= 0 { (pos, pos + offset) } else { (pos + offset, pos) };
            let lo = lo.max(0);
            let hi = hi.max(lo);
            prop_assert_eq!(w.start as i64, lo);
            prop_assert_eq!(w.count as i64, hi - lo);
        }

        #[test]
        fn prop_descending_tail_window(n in 1i64..10_000) {
            let w = PageWindow::plan(-1, -n);
            prop_assert_eq!(w, window(Direction::Descending, 0, n as u64));
        }
    }
}
