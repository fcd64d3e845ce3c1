use std::collections::HashMap;
use std::sync::Arc;
use std::sync::OnceLock;

use dashmap::DashMap;
use metrics::Key;

use crate::types::{Counter, Gauge};

static RECORDER: OnceLock<Recorder> = OnceLock::new();

/// In-process metrics registry backing the `metrics` facade.
///
/// Counters registered here can be averaged over time through
/// [`RegistrySource`](crate::RegistrySource), and averagers configured with a
/// gauge name publish their rate back into it. Histograms are not retained.
#[derive(Debug, Default)]
pub struct Recorder {
    counters: DashMap<Key, Arc<Counter>>,
    gauges: DashMap<Key, Arc<Gauge>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            counters: DashMap::new(),
            gauges: DashMap::new(),
        }
    }

    /// Installs the process-wide recorder used by the `metrics` macros.
    pub fn init() -> Result<&'static Self, metrics::SetRecorderError<&'static Self>> {
        let recorder = RECORDER.get_or_init(Self::new);

        metrics::set_global_recorder(recorder).map(|_| recorder)
    }

    /// The process-wide recorder, if [`Recorder::init`] ran.
    pub fn current() -> Option<&'static Self> {
        RECORDER.get()
    }

    /// Value of one exact counter series.
    pub fn counter(&self, key: &Key) -> Option<u64> {
        self.counters.get(key).map(|entry| entry.value().get())
    }

    /// Sum of every series named `name`, whatever its labels.
    pub fn counter_total(&self, name: &str) -> u64 {
        self.counters
            .iter()
            .filter(|entry| entry.key().name() == name)
            .fold(0u64, |sum, entry| sum.saturating_add(entry.value().get()))
    }

    /// Value of one exact gauge series.
    pub fn gauge(&self, key: &Key) -> Option<f64> {
        self.gauges.get(key).map(|entry| entry.value().get())
    }

    pub fn counters(&self) -> HashMap<String, u64> {
        self.counters
            .iter()
            .map(|entry| (crate::key::render(entry.key()), entry.value().get()))
            .collect()
    }

    pub fn gauges(&self) -> HashMap<String, f64> {
        self.gauges
            .iter()
            .map(|entry| (crate::key::render(entry.key()), entry.value().get()))
            .collect()
    }
}

impl metrics::Recorder for Recorder {
    fn describe_counter(
        &self,
        _key: metrics::KeyName,
        _unit: Option<metrics::Unit>,
        _description: metrics::SharedString,
    ) {
        //
    }

    fn describe_gauge(
        &self,
        _key: metrics::KeyName,
        _unit: Option<metrics::Unit>,
        _description: metrics::SharedString,
    ) {
        //
    }

    fn describe_histogram(
        &self,
        _key: metrics::KeyName,
        _unit: Option<metrics::Unit>,
        _description: metrics::SharedString,
    ) {
        //
    }

    fn register_counter(&self, key: &Key, _metadata: &metrics::Metadata<'_>) -> metrics::Counter {
        let counter = self
            .counters
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Counter::default()))
            .value()
            .clone();

        metrics::Counter::from_arc(counter)
    }

    fn register_gauge(&self, key: &Key, _metadata: &metrics::Metadata<'_>) -> metrics::Gauge {
        let gauge = self
            .gauges
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Gauge::default()))
            .value()
            .clone();

        metrics::Gauge::from_arc(gauge)
    }

    fn register_histogram(
        &self,
        _key: &Key,
        _metadata: &metrics::Metadata<'_>,
    ) -> metrics::Histogram {
        metrics::Histogram::noop()
    }
}
