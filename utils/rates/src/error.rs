use std::time::Duration;
use thiserror::Error;

/// Errors raised while building rate counters or loading their configuration.
///
/// Every variant is a construction-time failure. Once a counter exists its
/// reads never fail: the degenerate "not enough samples yet" state is part of
/// the numeric contract of [`AvgRate::try_rate`](crate::AvgRate::try_rate).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    #[error("sampling window must be greater than 0")]
    InvalidWindow,

    #[error("sampling window ({sampling_window:?}) must not exceed the averaging period ({period:?})")]
    WindowExceedsPeriod {
        sampling_window: Duration,
        period: Duration,
    },

    #[error(
        "averaging period ({period:?}) must be divisible by the sampling window ({sampling_window:?}) without a remainder"
    )]
    NonDivisiblePeriod {
        sampling_window: Duration,
        period: Duration,
    },

    #[error("ring capacity must be at least 1")]
    InvalidCapacity,

    #[error("no Tokio runtime available to drive the background sampler")]
    NoRuntime,

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("configuration error: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, RateError>;
