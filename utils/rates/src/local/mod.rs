//! Counters over a single trailing interval, derived from timestamped
//! additions at read time. No background task involved.

mod avg;
mod events;
mod rate;

pub use avg::{AvgCounter, AvgDurationCounter};
pub use rate::RateCounter;
