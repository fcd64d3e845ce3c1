//! # Loka Rates
//!
//! Windowed rate and average counters for instrumenting long-running services.
//!
//! ## Overview
//!
//! Loka Rates answers questions such as "how many blocks per second over the
//! last 30 seconds" or "how long does decoding take on average" without an
//! external time-series database. The core is an averaging engine that samples
//! a cumulative counter on a fixed interval into a ring of buckets and derives
//! the mean increase per interval from the deltas between buckets.
//!
//! ## Features
//!
//! - **📈 Windowed averages**: [`AvgRate`] averages any [`Countable`] source
//!   over a period that is a multiple of its sampling window
//! - **🔄 Background sampling**: one Tokio task per averager, stopped when the
//!   handle is dropped or through [`AvgRate::stop`]
//! - **⚡ On-demand sampling**: [`AvgRate::sync_now`] takes a sample right away
//!   and returns the value it read
//! - **🔌 Pluggable sources**: closures, [`SharedCounter`] and counters held by
//!   the [`Recorder`] registry through [`RegistrySource`]
//! - **⏱️ Instant counters**: [`RateCounter`], [`AvgCounter`] and
//!   [`AvgDurationCounter`] over a single trailing interval, no task needed
//!
//! ## Quick Start
//!
//! ```rust
//! use loka_rates::AvgRateCounter;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> loka_rates::Result<()> {
//! // Sample every second, average over the last 30 seconds
//! let blocks = AvgRateCounter::new(Duration::from_secs(1), Duration::from_secs(30), "blocks")?;
//!
//! blocks.add(10);
//! blocks.sync_now().await;
//!
//! println!("{}", blocks); // e.g. "0.000 blocks/s (10 total)"
//! # Ok(())
//! # }
//! ```
//!
//! ## Averaging Semantics
//!
//! With a sampling window `w` and a period `p`, the ring holds `p / w + 1`
//! cumulative totals, i.e. `p / w` deltas. While the ring fills up only the
//! deltas between samples actually taken are averaged. Before two samples
//! exist there is no rate: [`AvgRate::try_rate`] returns `None` and
//! [`AvgRate::rate`] returns `0.0`.
//!
//! ## Error Handling
//!
//! Invalid windows are rejected at construction with a [`RateError`]:
//! - zero sampling window
//! - sampling window longer than the period
//! - period not divisible by the sampling window
//!
//! Reads never fail.
//!
//! ## Thread Safety
//!
//! All counters are `Send + Sync`. The sampler is the only writer of an
//! averager's state; any number of readers can call `rate()` and `total()`
//! concurrently.

pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod local;
pub mod ring;
pub mod source;
pub mod types;

pub(crate) mod key;
pub(crate) mod recorder;

pub use config::RateConfig;
pub use engine::{AvgRate, AvgRateCounter, SlidingWindow};
pub use error::{RateError, Result};
pub use local::{AvgCounter, AvgDurationCounter, RateCounter};
pub use recorder::Recorder;
pub use ring::Ring;
pub use source::{Countable, RegistrySource, SharedCounter};
