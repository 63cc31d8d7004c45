//! Bucketed summaries over per-unit samples (e.g. per-core CPU load).
//!
//! Buckets are recomputed from scratch on every call. An empty bucket is kept
//! in the output with `mean: None` so consumers always get one summary per
//! bucket and never see NaN.

use std::ops::Range;

use crate::core::probe::PLACEHOLDER;

/// Summary of one contiguous half-open range of units.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketSummary {
    pub range: Range<usize>,
    /// Arithmetic mean, or `None` when the bucket has no samples.
    pub mean: Option<f64>,
}

impl BucketSummary {
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Mean rounded to the nearest integer.
    pub fn rounded(&self) -> Option<i64> {
        self.mean.map(|mean| mean.round() as i64)
    }

    /// `"Avg. 42%"`, or `"Avg. --%"` for a bucket without data.
    pub fn display_percent(&self) -> String {
        match self.rounded() {
            Some(value) => format!("Avg. {}%", value),
            None => format!("Avg. {}%", PLACEHOLDER),
        }
    }
}

/// Single boundary splitting `unit_count` units in two halves at `floor(n / 2)`.
pub fn halves(unit_count: usize) -> Vec<usize> {
    vec![unit_count / 2]
}

/// Ranges `[0, b1), [b1, b2), ..., [bk, n)`.
///
/// Each boundary is clamped into `[previous, n]`, so unordered or
/// out-of-range boundaries produce empty buckets instead of panicking.
pub fn bucket_ranges(unit_count: usize, boundaries: &[usize]) -> Vec<Range<usize>> {
    let mut start = 0;
    boundaries
        .iter()
        .copied()
        .chain(std::iter::once(unit_count))
        .map(|boundary| {
            let end = boundary.clamp(start, unit_count);
            let range = start..end;
            start = end;
            range
        })
        .collect()
}

/// Partition `samples` at `boundaries` and average `value` over each bucket.
pub fn aggregate<T, F>(samples: &[T], boundaries: &[usize], value: F) -> Vec<BucketSummary>
where
    F: Fn(&T) -> f64,
{
    bucket_ranges(samples.len(), boundaries)
        .into_iter()
        .map(|range| {
            let bucket = &samples[range.clone()];
            let mean = if bucket.is_empty() {
                None
            } else {
                let sum: f64 = bucket.iter().map(&value).sum();
                Some(sum / bucket.len() as f64)
            };
            BucketSummary { range, mean }
        })
        .collect()
}

/// Keeps the last good per-core load summary.
///
/// A tick whose sample is missing or malformed is skipped entirely: the
/// previously displayed buckets stay as they were.
#[derive(Debug, Clone)]
pub struct LoadAggregator {
    unit_count: usize,
    boundaries: Vec<usize>,
    current: Vec<BucketSummary>,
}

impl LoadAggregator {
    /// Two buckets split at `floor(unit_count / 2)`.
    pub fn halves(unit_count: usize) -> Self {
        Self::with_boundaries(unit_count, halves(unit_count))
    }

    pub fn with_boundaries(unit_count: usize, boundaries: Vec<usize>) -> Self {
        let current = bucket_ranges(unit_count, &boundaries)
            .into_iter()
            .map(|range| BucketSummary { range, mean: None })
            .collect();

        Self {
            unit_count,
            boundaries,
            current,
        }
    }

    pub fn unit_count(&self) -> usize {
        self.unit_count
    }

    pub fn current(&self) -> &[BucketSummary] {
        &self.current
    }

    /// Fold in one tick of per-unit loads.
    ///
    /// Returns `false`, leaving state untouched, when the sample is absent,
    /// empty, has a different unit count than configured, or holds
    /// non-finite values.
    pub fn update(&mut self, sample: Option<&[f32]>) -> bool {
        let Some(loads) = sample else {
            log::trace!("Load sample missing, tick skipped");
            return false;
        };

        if loads.is_empty() || loads.len() != self.unit_count {
            log::trace!(
                "Load sample has {} units, expected {}; tick skipped",
                loads.len(),
                self.unit_count
            );
            return false;
        }

        if loads.iter().any(|load| !load.is_finite()) {
            log::trace!("Load sample holds non-finite values, tick skipped");
            return false;
        }

        self.current = aggregate(loads, &self.boundaries, |load| f64::from(*load));
        true
    }
}
