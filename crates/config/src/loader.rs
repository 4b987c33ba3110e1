//! Layered configuration loading: defaults, JSON file, environment

use crate::config::Config;
use pulse_core::constants::*;
use pulse_core::{Error, Result, ResultExt};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

impl Config {
    /// Load configuration from an optional JSON file, then apply environment
    /// overrides and validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file; missing sections keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::file_system(path, "read", e))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("invalid configuration file '{}'", path.display()))?;
        debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Apply `PULSE_*` environment variable overrides in place
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_override(PULSE_MAX_BUFFER_SIZE_VAR)? {
            self.bus.max_buffer_size = value;
        }
        if let Some(value) = env_override(PULSE_DEDUP_WINDOW_MS_VAR)? {
            self.normalizer.dedup_window_ms = value;
        }
        if let Some(value) = env_override(PULSE_BATCH_SIZE_VAR)? {
            self.normalizer.batch_size = value;
        }
        if let Some(value) = env_override(PULSE_BATCH_DELAY_MS_VAR)? {
            self.normalizer.batch_delay_ms = value;
        }
        if let Some(value) = env_override::<String>(PULSE_ENVIRONMENT_VAR)? {
            self.normalizer.environment = value;
        }
        if let Some(value) = env_override::<String>(PULSE_LOG_LEVEL_VAR)? {
            self.logging.level = value;
        }
        Ok(())
    }
}

fn env_override<T>(variable: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Ok(raw) = std::env::var(variable) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>().map(Some).map_err(|e| {
        Error::configuration(format!("environment variable {variable}='{raw}' is invalid: {e}"))
    })
}
