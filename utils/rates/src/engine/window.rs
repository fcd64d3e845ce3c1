//! Delta-over-window arithmetic for cumulative samples.

use std::time::Duration;

use crate::error::{RateError, Result};
use crate::ring::Ring;

/// Checks a `(sampling_window, period)` pair and returns the bucket count it
/// implies.
///
/// An N-delta window needs N+1 raw samples, hence the extra bucket.
pub fn bucket_count(sampling_window: Duration, period: Duration) -> Result<usize> {
    if sampling_window.is_zero() {
        return Err(RateError::InvalidWindow);
    }

    if sampling_window > period {
        return Err(RateError::WindowExceedsPeriod {
            sampling_window,
            period,
        });
    }

    let window_nanos = sampling_window.as_nanos();
    let period_nanos = period.as_nanos();

    if period_nanos % window_nanos != 0 {
        return Err(RateError::NonDivisiblePeriod {
            sampling_window,
            period,
        });
    }

    usize::try_from(period_nanos / window_nanos)
        .ok()
        .and_then(|buckets| buckets.checked_add(1))
        .ok_or(RateError::InvalidCapacity)
}

/// Averaging state fed with periodic cumulative totals.
///
/// `record` is called by exactly one writer (the sampler). The rate is the
/// mean delta between consecutive real samples, i.e. events per sampling
/// window averaged over the period.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    sampling_window: Duration,
    period: Duration,
    bucket_count: usize,
    totals: Ring<u64>,
    actual_total: u64,
    actual_count: u64,
}

impl SlidingWindow {
    pub fn new(sampling_window: Duration, period: Duration) -> Result<Self> {
        let bucket_count = bucket_count(sampling_window, period)?;

        Ok(Self {
            sampling_window,
            period,
            bucket_count,
            totals: Ring::new(bucket_count)?,
            actual_total: 0,
            actual_count: 0,
        })
    }

    /// Stores a freshly read cumulative total.
    pub fn record(&mut self, total: u64) {
        self.totals.push(total);
        self.actual_total = total;
        self.actual_count = self.actual_count.saturating_add(1);
    }

    /// Mean delta per sampling window, or `None` until two real samples exist.
    ///
    /// Slots that were never written are skipped so that the zero they hold
    /// is not mistaken for an observation. A total lower than its
    /// predecessor contributes a zero delta.
    pub fn rate(&self) -> Option<f64> {
        let unwritten = (self.bucket_count as u64).saturating_sub(self.actual_count) as usize;

        let mut previous: Option<u64> = None;
        let mut sum = 0u64;
        let mut deltas = 0u64;

        for &total in self.totals.iter().skip(unwritten) {
            if let Some(previous) = previous {
                sum = sum.saturating_add(total.saturating_sub(previous));
                deltas += 1;
            }
            previous = Some(total);
        }

        if deltas == 0 {
            return None;
        }

        Some(sum as f64 / deltas as f64)
    }

    /// Last cumulative total read from the source.
    pub fn total(&self) -> u64 {
        self.actual_total
    }

    /// Number of samples recorded since creation.
    pub fn sample_count(&self) -> u64 {
        self.actual_count
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    pub fn sampling_window(&self) -> Duration {
        self.sampling_window
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
