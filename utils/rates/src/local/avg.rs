use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use super::events::EventLog;
use crate::format::{time_unit, window_label};

/// Average value per event over the last `interval`.
///
/// Adding 283, 23, 192 and 392 cache hits within the interval gives an
/// average of 222.5 cache hits per event.
///
/// ```rust
/// use loka_rates::AvgCounter;
/// use std::time::Duration;
///
/// let counter = AvgCounter::new(Duration::from_secs(1), "cache hits");
/// counter.add(283);
/// counter.add(23);
/// counter.add(192);
/// counter.add(392);
///
/// assert_eq!(counter.average(), 222.5);
/// assert_eq!(counter.to_string(), "avg 222.5 cache hits (in the last 1s) [total 890]");
/// ```
#[derive(Debug)]
pub struct AvgCounter {
    interval: Duration,
    event_type: String,
    events: Mutex<EventLog>,
    total: AtomicU64,
}

impl AvgCounter {
    pub fn new(interval: Duration, event_type: impl Into<String>) -> Self {
        Self {
            interval,
            event_type: event_type.into(),
            events: Mutex::new(EventLog::new(interval)),
            total: AtomicU64::new(0),
        }
    }

    /// Records one event carrying `value`. Zero is ignored.
    pub fn add(&self, value: u64) {
        if value == 0 {
            return;
        }

        self.events.lock().record(value);
        self.total.fetch_add(value, Ordering::Relaxed);
    }

    /// Mean value of the events inside the interval, `0.0` when there are none.
    pub fn average(&self) -> f64 {
        let (sum, count) = self.events.lock().summary();
        if count == 0 {
            return 0.0;
        }

        sum as f64 / count as f64
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn average_string(&self) -> String {
        self.average().to_string()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl fmt::Display for AvgCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "avg {} {} (in the last {}) [total {}]",
            self.average_string(),
            self.event_type,
            window_label(self.interval),
            self.total()
        )
    }
}

/// Average elapsed time per event over the last `interval`, in `unit`s.
///
/// Three operations taking 2s, 5s and 300ms average to about 2.433s each.
///
/// ```rust
/// use loka_rates::AvgDurationCounter;
/// use std::time::Duration;
///
/// let counter = AvgDurationCounter::new(Duration::from_secs(30), Duration::from_secs(1), "block");
/// counter.add_duration(Duration::from_secs(2));
/// counter.add_duration(Duration::from_secs(5));
/// counter.add_duration(Duration::from_millis(300));
///
/// assert!((counter.average() - 2.4333).abs() < 1e-3);
/// assert_eq!(counter.total(), 7.3);
/// ```
#[derive(Debug)]
pub struct AvgDurationCounter {
    interval: Duration,
    unit: Duration,
    description: String,
    events: Mutex<EventLog>,
    total_nanos: AtomicU64,
}

impl AvgDurationCounter {
    /// A zero `unit` is treated as one nanosecond.
    pub fn new(interval: Duration, unit: Duration, description: impl Into<String>) -> Self {
        Self {
            interval,
            unit: unit.max(Duration::from_nanos(1)),
            description: description.into(),
            events: Mutex::new(EventLog::new(interval)),
            total_nanos: AtomicU64::new(0),
        }
    }

    pub fn add_duration(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);

        self.events.lock().record(nanos);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    /// Records the time elapsed since `start`. Starts in the future are ignored.
    pub fn add_elapsed(&self, start: impl Into<Instant>) {
        let elapsed = Instant::now().saturating_duration_since(start.into());
        if elapsed.is_zero() {
            return;
        }

        self.add_duration(elapsed);
    }

    /// Mean duration per event inside the interval, in `unit`s.
    pub fn average(&self) -> f64 {
        let (sum, count) = self.events.lock().summary();
        if count == 0 {
            return 0.0;
        }

        sum as f64 / count as f64 / self.unit_nanos()
    }

    /// Sum of every recorded duration since creation, in `unit`s.
    pub fn total(&self) -> f64 {
        self.total_nanos.load(Ordering::Relaxed) as f64 / self.unit_nanos()
    }

    pub fn average_string(&self) -> String {
        self.average().to_string()
    }

    fn unit_nanos(&self) -> f64 {
        self.unit.as_nanos() as f64
    }
}

impl fmt::Display for AvgDurationCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = time_unit(self.unit);

        write!(
            f,
            "avg {}{} {} (in the last {}) [total {}{}]",
            self.average_string(),
            unit,
            self.description,
            window_label(self.interval),
            self.total(),
            unit
        )
    }
}
