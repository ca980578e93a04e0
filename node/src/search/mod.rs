//! Oldest-log range search.
//!
//! The upstream rejects log queries whose result set exceeds its per-call limit and
//! offers no paging, so the search narrows the range until a query fits. Ranges are
//! explored depth-first, older half before newer half, and the first non-empty
//! result wins: every block in an older half precedes every block in its newer
//! sibling, so that result holds the oldest log of the whole range.

use crate::upstream::{LogRecord, RpcFailure, UpstreamApi};
use alloy_primitives::Address;
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

/// Inclusive range of block heights, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockRange {
    start: u64,
    end: u64,
}

impl BlockRange {
    /// Returns `None` when `start > end`.
    pub fn new(start: u64, end: u64) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// `[0, end]`.
    pub fn up_to(end: u64) -> Self {
        Self { start: 0, end }
    }

    pub fn single(block: u64) -> Self {
        Self {
            start: block,
            end: block,
        }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, block: u64) -> bool {
        self.start <= block && block <= self.end
    }

    /// Split at `floor((start + end) / 2)` into `[start, mid]` and `[mid + 1, end]`.
    pub fn split(&self) -> Option<(Self, Self)> {
        if self.is_single() {
            return None;
        }
        let mid = self.start + (self.end - self.start) / 2;
        Some((
            Self {
                start: self.start,
                end: mid,
            },
            Self {
                start: mid + 1,
                end: self.end,
            },
        ))
    }
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

impl From<BlockRange> for std::ops::RangeInclusive<u64> {
    fn from(range: BlockRange) -> Self {
        range.start..=range.end
    }
}

/// Search failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error(transparent)]
    Upstream(#[from] RpcFailure),
    /// A single block still exceeds the upstream result limit.
    #[error("block {block} has more logs than the upstream returns per query")]
    Exhausted { block: u64 },
}

/// Counters describing one search.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    pub queries: u64,
    pub splits: u64,
    pub max_depth: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// First successful non-empty log set; its first element is the oldest log.
    /// Empty when the range holds no logs for the address.
    pub logs: Vec<LogRecord>,
    pub stats: SearchStats,
}

/// Find a log set for `address` in `range` that starts with the oldest log.
///
/// Assumes the upstream returns the logs of a successful query in ascending block
/// order; the result is not re-sorted.
pub async fn find_oldest_logs<A>(
    api: &A,
    address: Address,
    range: BlockRange,
) -> Result<SearchOutcome, SearchError>
where
    A: UpstreamApi + ?Sized,
{
    let mut stats = SearchStats::default();
    // Newer halves are pushed first so the older half is popped next.
    let mut pending = vec![(range, 0u32)];

    while let Some((range, depth)) = pending.pop() {
        stats.queries += 1;
        stats.max_depth = stats.max_depth.max(depth);
        trace!(%address, %range, depth, "querying logs");

        match api.get_logs(address, range).await {
            Ok(logs) if logs.is_empty() => {
                trace!(%range, "no logs in range");
            }
            Ok(logs) => {
                debug!(%range, count = logs.len(), queries = stats.queries, "found oldest log set");
                return Ok(SearchOutcome { logs, stats });
            }
            Err(err) if err.is_result_set_too_large() => {
                let Some((older, newer)) = range.split() else {
                    return Err(SearchError::Exhausted {
                        block: range.start(),
                    });
                };
                stats.splits += 1;
                debug!(%range, %older, %newer, "result set too large, splitting");
                pending.push((newer, depth + 1));
                pending.push((older, depth + 1));
            }
            Err(err) => return Err(err.into()),
        }
    }

    debug!(%address, queries = stats.queries, "no logs found in range");
    Ok(SearchOutcome {
        logs: Vec::new(),
        stats,
    })
}
