//! Batch scheduling over an ordered comment list.

use std::num::NonZeroUsize;
use std::ops::Range;

/// One batch: its zero-based index and the comment positions it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchWindow {
    /// Zero-based batch index within the whole comment list.
    pub index: usize,
    /// Positions of the batch's comments in the ordered list.
    pub range: Range<usize>,
}

impl BatchWindow {
    /// Returns the number of comments in the batch.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.range.end.saturating_sub(self.range.start)
    }

    /// Returns `true` when the batch holds no comments.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Iterator of batches for one invocation.
///
/// Batches never exceed the batch size, and at most `max_batches` are
/// produced when it is non-zero. Scheduling starts at `start_batch`, which
/// is how a resumed run skips batches completed earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSchedule {
    total: usize,
    batch_size: NonZeroUsize,
    next: usize,
    stop: usize,
}

impl BatchSchedule {
    /// Plans the batches for `total` comments.
    #[must_use]
    pub fn new(
        total: usize,
        batch_size: NonZeroUsize,
        start_batch: usize,
        max_batches: usize,
    ) -> Self {
        let total_batches = total.div_ceil(batch_size.get());
        let start = start_batch.min(total_batches);
        let stop = if max_batches == 0 {
            total_batches
        } else {
            start.saturating_add(max_batches).min(total_batches)
        };
        Self {
            total,
            batch_size,
            next: start,
            stop,
        }
    }

    /// Returns how many batches the whole comment list splits into.
    #[must_use]
    pub const fn total_batches(&self) -> usize {
        self.total.div_ceil(self.batch_size.get())
    }

    /// Returns the number of comments covered by the first `batches`
    /// batches.
    #[must_use]
    pub fn comments_in_first(&self, batches: usize) -> usize {
        batches.saturating_mul(self.batch_size.get()).min(self.total)
    }

    /// Returns `true` when batches remain beyond this invocation's limit.
    #[must_use]
    pub const fn leaves_remainder(&self) -> bool {
        self.stop < self.total_batches()
    }
}

impl Iterator for BatchSchedule {
    type Item = BatchWindow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.stop {
            return None;
        }
        let index = self.next;
        let start = self.comments_in_first(index);
        let end = start.saturating_add(self.batch_size.get()).min(self.total);
        self.next = index.saturating_add(1);
        Some(BatchWindow {
            index,
            range: start..end,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.stop.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BatchSchedule {}
