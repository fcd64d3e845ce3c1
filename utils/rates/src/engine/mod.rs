//! Windowed average-rate engine.
//!
//! - [`window`] - ring-backed delta arithmetic, free of any timing concern
//! - [`sampler`] - background task feeding a window from its source
//! - [`avg_rate`] - public handles tying the task to their own lifetime

mod avg_rate;
mod sampler;
mod window;

pub use avg_rate::{AvgRate, AvgRateCounter};
pub use window::{SlidingWindow, bucket_count};
