//! Countable sources: anything that can report a cumulative count.

use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::Recorder;

/// A monotonically non-decreasing cumulative count read by the sampler.
///
/// Implementations are read from the background sampler while the
/// application keeps writing to them, so reads must be safe to run
/// concurrently with the owner's updates. A source that goes backwards does
/// not break the engine but yields zero deltas for the affected samples.
pub trait Countable: Send + Sync + 'static {
    fn count(&self) -> u64;
}

impl<F> Countable for F
where
    F: Fn() -> u64 + Send + Sync + 'static,
{
    fn count(&self) -> u64 {
        self()
    }
}

/// Cloneable atomic counter usable both by application code and as a source.
#[derive(Debug, Clone, Default)]
pub struct SharedCounter {
    value: Arc<AtomicU64>,
}

impl SharedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Countable for SharedCounter {
    fn count(&self) -> u64 {
        self.get()
    }
}

/// Reads a counter out of a [`Recorder`], summed across every label set.
///
/// Works with both the global recorder (`&'static Recorder`) and a privately
/// owned one (`Arc<Recorder>`). A name that was never registered counts as 0.
#[derive(Debug, Clone)]
pub struct RegistrySource<R> {
    recorder: R,
    name: String,
}

impl<R> RegistrySource<R>
where
    R: Deref<Target = Recorder> + Send + Sync + 'static,
{
    pub fn new(recorder: R, name: impl Into<String>) -> Self {
        Self {
            recorder,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<R> Countable for RegistrySource<R>
where
    R: Deref<Target = Recorder> + Send + Sync + 'static,
{
    fn count(&self) -> u64 {
        self.recorder.counter_total(&self.name)
    }
}
