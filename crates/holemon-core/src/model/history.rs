// ── Blocked-query history ──

use serde::Serialize;

/// Slots kept: 24 hours of 10-minute buckets.
pub const HISTORY_CAPACITY: usize = 144;

/// Bounded series of blocked-query counts with its running maximum.
///
/// Built in one go from a server response; a refresh produces a new buffer
/// instead of appending to the old one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryBuffer {
    counts: Vec<u64>,
    high: u64,
}

impl HistoryBuffer {
    /// Take the first [`HISTORY_CAPACITY`] counts; the rest are dropped.
    pub fn from_counts(counts: impl IntoIterator<Item = u64>) -> Self {
        let mut buffer = Self {
            counts: Vec::with_capacity(HISTORY_CAPACITY),
            high: 0,
        };
        for count in counts.into_iter().take(HISTORY_CAPACITY) {
            buffer.high = buffer.high.max(count);
            buffer.counts.push(count);
        }
        buffer
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Largest stored count, 0 when empty.
    pub fn high(&self) -> u64 {
        self.high
    }

    pub fn capacity(&self) -> usize {
        HISTORY_CAPACITY
    }
}
