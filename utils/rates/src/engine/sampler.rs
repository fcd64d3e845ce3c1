//! Background task refreshing a [`SlidingWindow`] from its source.

use std::sync::{Arc, Once};
use std::time::Duration;

use parking_lot::{RwLock, RwLockReadGuard};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

use super::SlidingWindow;
use crate::error::{RateError, Result};
use crate::source::Countable;

/// State shared between an averager handle and its sampler task.
///
/// The task only ever holds this, never the handle, so releasing the handle
/// is enough to shut the task down.
pub(crate) struct RateState {
    source: Box<dyn Countable>,
    window: RwLock<SlidingWindow>,
    gauge: Option<metrics::Gauge>,
}

impl RateState {
    pub(crate) fn new(
        source: Box<dyn Countable>,
        window: SlidingWindow,
        gauge: Option<metrics::Gauge>,
    ) -> Self {
        Self {
            source,
            window: RwLock::new(window),
            gauge,
        }
    }

    /// Reads the source once and records the value. Sampler task only.
    fn sample(&self) -> u64 {
        let total = self.source.count();

        let rate = {
            let mut window = self.window.write();
            window.record(total);
            window.rate()
        };

        if let (Some(gauge), Some(rate)) = (&self.gauge, rate) {
            gauge.set(rate);
        }

        total
    }

    pub(crate) fn window(&self) -> RwLockReadGuard<'_, SlidingWindow> {
        self.window.read()
    }
}

/// Handle on the running sampler task.
///
/// * `wake` carries "sample now" requests, each with its own reply slot.
/// * `stop` flips to `true` exactly once; every waiter observes it.
pub(crate) struct Sampler {
    wake: mpsc::Sender<oneshot::Sender<u64>>,
    stop: watch::Sender<bool>,
    once: Once,
    task: JoinHandle<()>,
}

impl Sampler {
    /// Spawns the sampler on the current Tokio runtime.
    pub(crate) fn spawn(state: Arc<RateState>, sampling_window: Duration) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| RateError::NoRuntime)?;

        let (wake, wake_rx) = mpsc::channel(1);
        let (stop, stop_rx) = watch::channel(false);
        let task = runtime.spawn(run(state, sampling_window, wake_rx, stop_rx));

        Ok(Self {
            wake,
            stop,
            once: Once::new(),
            task,
        })
    }

    /// Requests an immediate sample and waits for it.
    ///
    /// Returns the total read for this request, or `None` when the sampler
    /// stopped before serving it.
    pub(crate) async fn sync_now(&self) -> Option<u64> {
        let mut stopped = self.stop.subscribe();
        if *stopped.borrow_and_update() {
            return None;
        }

        let (reply, performed) = oneshot::channel();

        tokio::select! {
            biased;
            _ = stopped.changed() => return None,
            sent = self.wake.send(reply) => {
                if sent.is_err() {
                    return None;
                }
            }
        }

        tokio::select! {
            biased;
            total = performed => total.ok(),
            _ = stopped.changed() => None,
        }
    }

    /// Signals the task to exit. Safe to call any number of times, concurrently.
    pub(crate) fn stop(&self) {
        self.once.call_once(|| {
            self.stop.send_replace(true);
            debug!("Rate sampler stop requested");
        });
    }

    pub(crate) fn is_stopped(&self) -> bool {
        *self.stop.borrow()
    }

    /// Whether the task has fully exited.
    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

async fn run(
    state: Arc<RateState>,
    sampling_window: Duration,
    mut wake: mpsc::Receiver<oneshot::Sender<u64>>,
    mut stop: watch::Receiver<bool>,
) {
    let mut ticker = time::interval_at(Instant::now() + sampling_window, sampling_window);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(sampling_window = ?sampling_window, "Rate sampler started");

    loop {
        tokio::select! {
            biased;
            _ = stop.changed() => break,
            request = wake.recv() => {
                let Some(reply) = request else {
                    break;
                };

                let total = state.sample();
                debug!(total, "Synchronous sample performed");

                // The requester may have given up waiting.
                let _ = reply.send(total);
            }
            _ = ticker.tick() => {
                let total = state.sample();
                trace!(total, "Periodic sample");
            }
        }
    }

    info!(sampling_window = ?sampling_window, "Rate sampler stopped");
}
