use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::SlidingWindow;
use super::sampler::{RateState, Sampler};
use crate::config::RateConfig;
use crate::error::Result;
use crate::format::time_unit;
use crate::source::{Countable, SharedCounter};

/// Average rate of a cumulative source over a trailing period.
///
/// Every `sampling_window` a background task reads the source and stores the
/// total in a ring of `period / sampling_window + 1` buckets. The rate is the
/// mean increase per sampling window across that ring.
///
/// Suppose a block counter moves like this with a 1s sampling window:
///
/// ```text
/// 0s -> 1s   10 blocks
/// 1s -> 2s    3 blocks
/// 2s -> 3s    0 blocks
/// 3s -> 4s    7 blocks
/// ```
///
/// With a 3s period the rate after the fourth second is
/// `(3 + 0 + 7) / 3 = 3.333 blocks/s`: the window covers the last three
/// deltas only.
///
/// The sampler runs on the Tokio runtime the handle was created on and stops
/// when the handle is dropped, or earlier through [`AvgRate::stop`].
///
/// # Examples
///
/// ```rust
/// use loka_rates::{AvgRate, SharedCounter};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> loka_rates::Result<()> {
/// let blocks = SharedCounter::new();
/// let rate = AvgRate::new(
///     blocks.clone(),
///     Duration::from_secs(1),
///     Duration::from_secs(30),
///     "blocks",
/// )?;
///
/// blocks.add(12);
/// assert_eq!(rate.sync_now().await, Some(12));
/// assert_eq!(rate.total(), 12);
/// # Ok(())
/// # }
/// ```
pub struct AvgRate {
    state: Arc<RateState>,
    sampler: Sampler,
    unit: String,
    sampling_window: Duration,
    period: Duration,
}

impl AvgRate {
    /// Starts averaging `source`. Must be called within a Tokio runtime.
    pub fn new<C: Countable>(
        source: C,
        sampling_window: Duration,
        period: Duration,
        unit: impl Into<String>,
    ) -> Result<Self> {
        Self::start(
            Box::new(source),
            &RateConfig::new(sampling_window, period, unit),
        )
    }

    /// Starts averaging `source` with a validated configuration.
    pub fn from_config<C: Countable>(config: &RateConfig, source: C) -> Result<Self> {
        config.validate()?;
        Self::start(Box::new(source), config)
    }

    fn start(source: Box<dyn Countable>, config: &RateConfig) -> Result<Self> {
        let window = SlidingWindow::new(config.sampling_window, config.period)?;
        let bucket_count = window.bucket_count();
        let gauge = config.gauge.clone().map(|name| metrics::gauge!(name));

        let state = Arc::new(RateState::new(source, window, gauge));
        let sampler = Sampler::spawn(Arc::clone(&state), config.sampling_window)?;

        debug!(
            unit = %config.unit,
            sampling_window = ?config.sampling_window,
            period = ?config.period,
            bucket_count,
            "Created average rate"
        );

        Ok(Self {
            state,
            sampler,
            unit: config.unit.clone(),
            sampling_window: config.sampling_window,
            period: config.period,
        })
    }

    /// Average increase per sampling window, `0.0` until two samples exist.
    pub fn rate(&self) -> f64 {
        self.try_rate().unwrap_or(0.0)
    }

    /// Average increase per sampling window, `None` until two samples exist.
    pub fn try_rate(&self) -> Option<f64> {
        self.state.window().rate()
    }

    /// Most recent value read from the source.
    pub fn total(&self) -> u64 {
        self.state.window().total()
    }

    /// The rate with three decimals.
    pub fn rate_string(&self) -> String {
        format!("{:.3}", self.rate())
    }

    /// Number of samples taken so far.
    pub fn sample_count(&self) -> u64 {
        self.state.window().sample_count()
    }

    pub fn bucket_count(&self) -> usize {
        self.state.window().bucket_count()
    }

    pub fn sampling_window(&self) -> Duration {
        self.sampling_window
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Samples the source immediately and waits until it is recorded.
    ///
    /// Returns the total read for this request, or `None` if the sampler is
    /// stopped (before or while the request is served).
    pub async fn sync_now(&self) -> Option<u64> {
        self.sampler.sync_now().await
    }

    /// Stops the background sampler. Reads keep returning the last state.
    pub fn stop(&self) {
        self.sampler.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.sampler.is_stopped()
    }

    /// Whether the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.sampler.is_finished()
    }
}

impl Drop for AvgRate {
    fn drop(&mut self) {
        self.sampler.stop();
    }
}

impl fmt::Display for AvgRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} ({} total)",
            self.rate_string(),
            self.unit,
            time_unit(self.sampling_window),
            self.total()
        )
    }
}

impl fmt::Debug for AvgRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvgRate")
            .field("unit", &self.unit)
            .field("sampling_window", &self.sampling_window)
            .field("period", &self.period)
            .field("total", &self.total())
            .field("rate", &self.try_rate())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// [`AvgRate`] over its own atomic counter.
///
/// ```rust
/// use loka_rates::AvgRateCounter;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> loka_rates::Result<()> {
/// let counter = AvgRateCounter::new(Duration::from_secs(1), Duration::from_secs(10), "blocks")?;
/// counter.add(3);
/// counter.inc();
/// assert_eq!(counter.count(), 4);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AvgRateCounter {
    counter: SharedCounter,
    rate: AvgRate,
}

impl AvgRateCounter {
    pub fn new(sampling_window: Duration, period: Duration, unit: impl Into<String>) -> Result<Self> {
        let counter = SharedCounter::new();
        let rate = AvgRate::new(counter.clone(), sampling_window, period, unit)?;

        Ok(Self { counter, rate })
    }

    pub fn from_config(config: &RateConfig) -> Result<Self> {
        let counter = SharedCounter::new();
        let rate = AvgRate::from_config(config, counter.clone())?;

        Ok(Self { counter, rate })
    }

    /// Tracks `value` more events.
    pub fn add(&self, value: u64) {
        self.counter.add(value);
    }

    pub fn inc(&self) {
        self.counter.add(1);
    }

    /// Live counter value, including events the sampler has not read yet.
    pub fn count(&self) -> u64 {
        self.counter.get()
    }

    pub fn rate(&self) -> f64 {
        self.rate.rate()
    }

    pub fn try_rate(&self) -> Option<f64> {
        self.rate.try_rate()
    }

    /// Counter value as of the last sample.
    pub fn total(&self) -> u64 {
        self.rate.total()
    }

    pub fn rate_string(&self) -> String {
        self.rate.rate_string()
    }

    pub async fn sync_now(&self) -> Option<u64> {
        self.rate.sync_now().await
    }

    pub fn stop(&self) {
        self.rate.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.rate.is_stopped()
    }

    pub fn as_avg_rate(&self) -> &AvgRate {
        &self.rate
    }
}

impl fmt::Display for AvgRateCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.rate, f)
    }
}
