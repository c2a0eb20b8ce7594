//! Fork-join row scheduler.
//!
//! Every engine operation writes its destination buffer through this
//! module. The output rows are split into at most `P` contiguous
//! partitions, each partition is handed to one worker together with the
//! exclusive slice of the destination it owns, and the call returns once
//! all workers are done.
//!
//! Workers never share mutable state: the destination is cut with
//! `chunks_mut`, so two partitions can never alias. Each output value
//! depends only on the inputs, which makes results byte-identical for
//! any partition count.
//!
//! With the `parallel` feature (default) partitions run on the rayon
//! global pool; without it they run one after another on the caller's
//! thread.
//!
//! # Example
//!
//! ```rust
//! use pxl_ops::parallel::Scheduler;
//!
//! let sched = Scheduler::with_partitions(3);
//! let ranges = sched.partition(10);
//! assert_eq!(ranges, vec![0..4, 4..8, 8..10]);
//!
//! let mut rows = vec![0u32; 10 * 2];
//! sched.for_each_rows(&mut rows, 2, |range, chunk| {
//!     for (y, row) in range.zip(chunk.chunks_exact_mut(2)) {
//!         row.fill(y as u32);
//!     }
//! });
//! assert_eq!(rows[19], 9);
//! ```

use crate::OpsResult;
use pxl_core::{PixelBuffer, CHANNELS};
use std::ops::Range;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Splits `[0, total)` into at most `parts` contiguous, non-overlapping ranges.
///
/// All ranges but the last have equal length; the union covers
/// `[0, total)` exactly once. `parts == 0` is treated as 1.
///
/// ```rust
/// use pxl_ops::parallel::partition;
///
/// assert_eq!(partition(5, 2), vec![0..3, 3..5]);
/// assert_eq!(partition(2, 8), vec![0..1, 1..2]);
/// assert!(partition(0, 4).is_empty());
/// ```
pub fn partition(total: usize, parts: usize) -> Vec<Range<usize>> {
    if total == 0 {
        return Vec::new();
    }
    let chunk = total.div_ceil(parts.max(1));
    (0..total)
        .step_by(chunk)
        .map(|start| start..(start + chunk).min(total))
        .collect()
}

/// Number of execution units available to the scheduler.
fn available_parallelism() -> usize {
    #[cfg(feature = "parallel")]
    {
        rayon::current_num_threads().max(1)
    }
    #[cfg(not(feature = "parallel"))]
    {
        1
    }
}

/// Partition-count hint plus the fork-join dispatch primitives.
///
/// `Scheduler::default()` is [`Scheduler::auto`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduler {
    partitions: usize,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::auto()
    }
}

impl Scheduler {
    /// One partition per thread of the rayon pool (1 without `parallel`).
    pub fn auto() -> Self {
        Self {
            partitions: available_parallelism(),
        }
    }

    /// Pins the partition count. Zero is raised to 1.
    pub fn with_partitions(partitions: usize) -> Self {
        Self {
            partitions: partitions.max(1),
        }
    }

    /// Runs everything as a single partition.
    pub fn sequential() -> Self {
        Self::with_partitions(1)
    }

    /// Returns the partition-count hint.
    #[inline]
    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// Splits `[0, total)` according to this scheduler's hint.
    pub fn partition(&self, total: usize) -> Vec<Range<usize>> {
        partition(total, self.partitions)
    }

    /// Calls `worker` once per partition of `[0, total)` and waits for all.
    ///
    /// ```rust
    /// use pxl_ops::parallel::Scheduler;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    ///
    /// let seen = AtomicUsize::new(0);
    /// Scheduler::with_partitions(4).for_each_range(100, |r| {
    ///     seen.fetch_add(r.len(), Ordering::Relaxed);
    /// });
    /// assert_eq!(seen.into_inner(), 100);
    /// ```
    pub fn for_each_range<F>(&self, total: usize, worker: F)
    where
        F: Fn(Range<usize>) + Sync + Send,
    {
        let ranges = self.partition(total);
        debug!(total, partitions = ranges.len(), "dispatching ranges");

        #[cfg(feature = "parallel")]
        ranges.into_par_iter().for_each(worker);

        #[cfg(not(feature = "parallel"))]
        ranges.into_iter().for_each(worker);
    }

    /// Splits `dst` into row partitions and hands each worker its rows.
    ///
    /// `dst` is treated as `dst.len() / row_len` rows of `row_len`
    /// elements. The worker receives the row range it owns and the
    /// matching sub-slice of `dst`.
    pub fn for_each_rows<T, F>(&self, dst: &mut [T], row_len: usize, worker: F)
    where
        T: Send,
        F: Fn(Range<usize>, &mut [T]) + Sync + Send,
    {
        if row_len == 0 || dst.is_empty() {
            return;
        }
        let rows = dst.len() / row_len;
        let rows_per_part = rows.div_ceil(self.partitions).max(1);
        debug!(rows, partitions = rows.div_ceil(rows_per_part), "dispatching rows");

        let run = |(i, chunk): (usize, &mut [T])| {
            let start = i * rows_per_part;
            worker(start..start + chunk.len() / row_len, chunk);
        };

        #[cfg(feature = "parallel")]
        dst.par_chunks_mut(rows_per_part * row_len).enumerate().for_each(run);

        #[cfg(not(feature = "parallel"))]
        dst.chunks_mut(rows_per_part * row_len).enumerate().for_each(run);
    }

    /// Allocates a `width x height` buffer and fills it row by row.
    ///
    /// `row_fn(y, row)` receives the destination row `y` (`width * 4` bytes).
    pub fn render<F>(&self, width: usize, height: usize, row_fn: F) -> OpsResult<PixelBuffer>
    where
        F: Fn(usize, &mut [u8]) + Sync + Send,
    {
        let row_len = width * CHANNELS;
        let mut data = vec![0u8; row_len * height];
        self.for_each_rows(&mut data, row_len, |range, chunk| {
            for (y, row) in range.zip(chunk.chunks_exact_mut(row_len)) {
                row_fn(y, row);
            }
        });
        Ok(PixelBuffer::from_raw(width, height, data)?)
    }
}
