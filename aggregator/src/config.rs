//! Reporter configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{MetricsError, Result};

/// Environment variable prefix, e.g. `ORBIS_INTERVAL_MS=1000`
pub const ENV_PREFIX: &str = "ORBIS";

/// Default report cadence
pub const DEFAULT_INTERVAL_MS: u64 = 3000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Milliseconds between reports
    pub interval_ms: u64,

    /// Reset the frame metrics after each report so every report covers only
    /// its own window. When false, averages accumulate for the whole session.
    pub reset_after_report: bool,

    /// Sample system and process memory for each report
    pub include_memory: bool,

    /// Reports buffered per subscriber before slow subscribers start lagging
    pub channel_capacity: usize,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            reset_after_report: true,
            include_memory: true,
            channel_capacity: 16,
        }
    }
}

impl ReporterConfig {
    /// Load defaults, then the optional file (TOML, JSON or YAML by extension),
    /// then `ORBIS_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            ::config::Config::builder().add_source(::config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(MetricsError::InvalidConfig(
                "interval_ms must be greater than 0".into(),
            ));
        }

        if self.channel_capacity == 0 {
            return Err(MetricsError::InvalidConfig(
                "channel_capacity must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}
