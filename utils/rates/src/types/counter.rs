use std::sync::atomic::{AtomicU64, Ordering};

/// Registry-side storage of a cumulative counter.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }
}

impl metrics::CounterFn for Counter {
    fn increment(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Release);
    }

    fn absolute(&self, value: u64) {
        // Cumulative counters only move forward.
        self.value.fetch_max(value, Ordering::Release);
    }
}
