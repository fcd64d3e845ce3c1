use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::engine::bucket_count;
use crate::error::{RateError, Result};

/// Settings of one averaged rate.
///
/// ```toml
/// unit = "blocks"
/// gauge = "head_blocks_rate"
///
/// [sampling_window]
/// secs = 1
/// nanos = 0
///
/// [period]
/// secs = 30
/// nanos = 0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateConfig {
    /// Interval between two samples of the source
    pub sampling_window: Duration,
    /// Span covered by the average, a multiple of `sampling_window`
    pub period: Duration,
    /// Name of the counted thing, used in the formatted output
    pub unit: String,
    /// Gauge the sampler publishes the current rate to, if any
    #[serde(default)]
    pub gauge: Option<String>,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            sampling_window: Duration::from_secs(1),
            period: Duration::from_secs(30),
            unit: "events".to_string(),
            gauge: None,
        }
    }
}

impl RateConfig {
    pub fn new(sampling_window: Duration, period: Duration, unit: impl Into<String>) -> Self {
        Self {
            sampling_window,
            period,
            unit: unit.into(),
            gauge: None,
        }
    }

    pub fn with_gauge(mut self, name: impl Into<String>) -> Self {
        self.gauge = Some(name.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        bucket_count(self.sampling_window, self.period)?;

        if self.unit.trim().is_empty() {
            return Err(RateError::MissingField {
                field: "unit".to_string(),
            });
        }

        if let Some(gauge) = &self.gauge {
            if gauge.trim().is_empty() {
                return Err(RateError::MissingField {
                    field: "gauge".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Loads and validates a TOML configuration file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| RateError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config = Self::from_toml(&content)?;
        debug!(
            path = %path.display(),
            sampling_window = ?config.sampling_window,
            period = ?config.period,
            unit = %config.unit,
            "Loaded rate configuration"
        );

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| RateError::Config {
            message: format!("Failed to parse config: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }
}
