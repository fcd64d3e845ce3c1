use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::events::EventLog;
use crate::format::time_unit;

/// How many events happened during the last `interval`.
///
/// Unlike [`AvgRate`](crate::AvgRate) there is no averaging and no background
/// task: if 3 events arrive within one second the rate is 3 events/s, and once
/// a full second passes without events the rate is back to 0.
///
/// ```rust
/// use loka_rates::RateCounter;
///
/// let counter = RateCounter::per_second("blocks");
/// counter.inc();
/// counter.inc();
/// counter.add(3);
///
/// assert_eq!(counter.rate(), 5);
/// assert_eq!(counter.to_string(), "5 blocks/s (5 total)");
/// ```
#[derive(Debug)]
pub struct RateCounter {
    interval: Duration,
    unit: String,
    events: Mutex<EventLog>,
    total: AtomicU64,
}

impl RateCounter {
    pub fn new(interval: Duration, unit: impl Into<String>) -> Self {
        Self {
            interval,
            unit: unit.into(),
            events: Mutex::new(EventLog::new(interval)),
            total: AtomicU64::new(0),
        }
    }

    pub fn per_second(unit: impl Into<String>) -> Self {
        Self::new(Duration::from_secs(1), unit)
    }

    pub fn per_minute(unit: impl Into<String>) -> Self {
        Self::new(Duration::from_secs(60), unit)
    }

    pub fn inc(&self) {
        self.add(1);
    }

    /// Records `value` events now. Zero is ignored.
    pub fn add(&self, value: u64) {
        if value == 0 {
            return;
        }

        self.events.lock().record(value);
        self.total.fetch_add(value, Ordering::Relaxed);
    }

    /// Events recorded during the trailing interval.
    pub fn rate(&self) -> u64 {
        self.events.lock().summary().0
    }

    /// Events recorded since creation.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn rate_string(&self) -> String {
        self.rate().to_string()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }
}

impl fmt::Display for RateCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} ({} total)",
            self.rate(),
            self.unit,
            time_unit(self.interval),
            self.total()
        )
    }
}
