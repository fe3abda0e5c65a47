//! Pipeline configuration file support.
//!
//! Operational knobs (lookback window, cache TTL) can be read from a TOML
//! configuration file or from environment variables. Statistical policy
//! (match radius, outlier threshold, smoothing window, fill defaults) is
//! compile-time constant and intentionally not configurable.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the lookback window in days.
pub const ENV_LOOKBACK_DAYS: &str = "HEMS_LOOKBACK_DAYS";
/// Environment variable overriding the cache TTL in hours.
pub const ENV_CACHE_TTL_HOURS: &str = "HEMS_CACHE_TTL_HOURS";

/// Configuration for the historical data pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// How far back to query the store, in days.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// How long a cached dataset stays valid, in hours.
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u32,
}

fn default_lookback_days() -> u32 {
    365
}

fn default_cache_ttl_hours() -> u32 {
    6
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            cache_ttl_hours: default_cache_ttl_hours(),
        }
    }
}

impl PipelineConfig {
    /// Load pipeline configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(PipelineConfig)` if the file parses
    /// * `Err` if the file cannot be read or is not valid TOML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Build configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(val) = std::env::var(ENV_LOOKBACK_DAYS) {
            if let Ok(days) = val.parse() {
                config.lookback_days = days;
            }
        }
        if let Ok(val) = std::env::var(ENV_CACHE_TTL_HOURS) {
            if let Ok(hours) = val.parse() {
                config.cache_ttl_hours = hours;
            }
        }
        config
    }
}
