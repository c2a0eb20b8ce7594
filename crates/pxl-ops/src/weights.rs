//! Per-axis resampling weight tables.
//!
//! For every destination index `i` along one axis, a [`WeightEntry`]
//! lists the contiguous source indices that contribute to it and their
//! normalized weights. Tables are computed once per axis and reused
//! across all rows (or columns) of a pass.
//!
//! # Mapping
//!
//! With `scale = src / dst`, destination index `i` maps back to the
//! source-space center `(i + 0.5) * scale - 0.5`. When downscaling, the
//! filter is stretched by `scale` so every source sample is covered.
//! [`Filter::NearestNeighbor`] is never stretched: it always picks one
//! sample.
//!
//! The stretched support is capped at [`MAX_SUPPORT_PER_SAMPLE`] times the
//! source length, or [`MIN_SUPPORT_CAP`] for short axes, which bounds the
//! work per entry.
//!
//! Source indices that fall outside `[0, src)` are clamped to the nearest
//! edge and their weight is added there, which extends the border.
//!
//! ```rust
//! use pxl_ops::{Filter, WeightTable};
//!
//! let table = WeightTable::build(4, 2, &Filter::Box).unwrap();
//! let e = table.entry(0);
//! assert_eq!(e.range(), 0..2);
//! assert_eq!(e.weights(), &[0.5, 0.5]);
//! ```

use crate::{Filter, OpsError, OpsResult};
use std::ops::Range;
use tracing::trace;

/// Support cap per source sample.
pub const MAX_SUPPORT_PER_SAMPLE: f64 = 16.0;

/// Support cap applied to short axes.
pub const MIN_SUPPORT_CAP: f64 = 65_536.0;

/// Source span and weights for one destination index.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightEntry {
    low: usize,
    weights: Vec<f64>,
}

impl WeightEntry {
    /// First contributing source index.
    #[inline]
    pub fn low(&self) -> usize {
        self.low
    }

    /// One past the last contributing source index.
    #[inline]
    pub fn high(&self) -> usize {
        self.low + self.weights.len()
    }

    /// Contributing source indices, `low..high`.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.low..self.high()
    }

    /// Weights, one per index in [`range`](Self::range).
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }
}

/// Weight entries for every destination index of one axis.
#[derive(Debug, Clone)]
pub struct WeightTable {
    src_len: usize,
    entries: Vec<WeightEntry>,
}

impl WeightTable {
    /// Builds the table mapping `src_len` samples onto `dst_len`.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidDimension`] if either length is zero,
    /// [`OpsError::InvalidParameter`] if the scaled filter support exceeds
    /// `max(MAX_SUPPORT_PER_SAMPLE * src_len, MIN_SUPPORT_CAP)`.
    pub fn build(src_len: usize, dst_len: usize, filter: &Filter) -> OpsResult<Self> {
        if src_len == 0 || dst_len == 0 {
            return Err(OpsError::InvalidDimension(format!(
                "weight table {src_len} -> {dst_len}"
            )));
        }

        let scale = src_len as f64 / dst_len as f64;
        let filter_scale = match filter {
            Filter::NearestNeighbor => 1.0,
            _ => scale.max(1.0),
        };
        let support = filter.support() * filter_scale;
        let cap = (src_len as f64 * MAX_SUPPORT_PER_SAMPLE).max(MIN_SUPPORT_CAP);
        if support > cap {
            return Err(OpsError::InvalidParameter(format!(
                "filter support {support} exceeds {cap} for a {src_len}-sample axis"
            )));
        }
        let last = src_len - 1;

        let entries = (0..dst_len)
            .map(|i| {
                let center = (i as f64 + 0.5) * scale - 0.5;
                let mut start = (center - support).ceil() as i64;
                let mut end = (center + support).floor() as i64;
                if start > end {
                    // Support narrower than the sample spacing.
                    start = center.round() as i64;
                    end = start;
                }

                // Accumulate into a dense span over the clamped indices.
                let low = start.clamp(0, last as i64) as usize;
                let high = end.clamp(0, last as i64) as usize;
                let mut weights = vec![0.0f64; high - low + 1];
                for j in start..=end {
                    let w = filter.weight((j as f64 - center) / filter_scale);
                    let k = j.clamp(0, last as i64) as usize;
                    weights[k - low] += w;
                }

                let mut entry = trim(low, weights);
                let sum = entry.sum();
                if sum != 0.0 {
                    entry.weights.iter_mut().for_each(|w| *w /= sum);
                }
                entry
            })
            .collect::<Vec<_>>();

        trace!(
            src_len,
            dst_len,
            filter = %filter,
            max_taps = entries.iter().map(|e| e.weights.len()).max().unwrap_or(0),
            "built weight table"
        );

        Ok(Self { src_len, entries })
    }

    /// Source length this table reads from.
    #[inline]
    pub fn src_len(&self) -> usize {
        self.src_len
    }

    /// Destination length, i.e. number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: tables are built for non-empty axes only.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, indexed by destination position.
    #[inline]
    pub fn entries(&self) -> &[WeightEntry] {
        &self.entries
    }

    /// Entry for destination index `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    #[inline]
    pub fn entry(&self, i: usize) -> &WeightEntry {
        &self.entries[i]
    }

    /// Widest span of any entry.
    pub fn max_taps(&self) -> usize {
        self.entries.iter().map(|e| e.weights.len()).max().unwrap_or(0)
    }
}

/// Drops zero weights at both ends of the span.
///
/// A span that is all zeros keeps its first index so the entry stays
/// non-empty.
fn trim(low: usize, mut weights: Vec<f64>) -> WeightEntry {
    let first = weights.iter().position(|&w| w != 0.0);
    let Some(first) = first else {
        weights.truncate(1);
        return WeightEntry { low, weights };
    };
    let last = weights.iter().rposition(|&w| w != 0.0).unwrap_or(first);
    weights.truncate(last + 1);
    weights.drain(..first);
    WeightEntry {
        low: low + first,
        weights,
    }
}
