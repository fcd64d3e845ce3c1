use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

/// Number of slots an interval is split into.
const RESOLUTION: u64 = 20;

#[derive(Debug, Clone, Copy)]
struct Slot {
    index: u64,
    sum: u64,
    count: u64,
}

/// Trailing log of timestamped additions, coalesced per slot.
///
/// Additions landing in the same `interval / 20` slot share one entry, so
/// memory stays bounded whatever the event rate. An addition stops counting
/// once its slot is a full interval old.
#[derive(Debug)]
pub(crate) struct EventLog {
    origin: Instant,
    slot_nanos: u128,
    slots: VecDeque<Slot>,
}

impl EventLog {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            origin: Instant::now(),
            slot_nanos: (interval.as_nanos() / RESOLUTION as u128).max(1),
            slots: VecDeque::with_capacity(RESOLUTION as usize + 1),
        }
    }

    pub(crate) fn record(&mut self, value: u64) {
        let index = self.current_slot();
        self.expire(index);

        match self.slots.back_mut() {
            Some(slot) if slot.index == index => {
                slot.sum = slot.sum.saturating_add(value);
                slot.count += 1;
            }
            _ => self.slots.push_back(Slot {
                index,
                sum: value,
                count: 1,
            }),
        }
    }

    /// Sum of values and number of additions still inside the interval.
    pub(crate) fn summary(&mut self) -> (u64, u64) {
        let index = self.current_slot();
        self.expire(index);

        self.slots.iter().fold((0u64, 0u64), |(sum, count), slot| {
            (sum.saturating_add(slot.sum), count + slot.count)
        })
    }

    fn current_slot(&self) -> u64 {
        let elapsed = Instant::now().saturating_duration_since(self.origin).as_nanos();
        u64::try_from(elapsed / self.slot_nanos).unwrap_or(u64::MAX)
    }

    fn expire(&mut self, current: u64) {
        while let Some(slot) = self.slots.front() {
            if slot.index.saturating_add(RESOLUTION) <= current {
                self.slots.pop_front();
            } else {
                break;
            }
        }
    }
}
