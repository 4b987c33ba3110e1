//! Centralized configuration for pulse
//!
//! `Config` is the single source of truth for every tunable of the event
//! core. It is immutable after loading and cheap to clone, so the process
//! entry point builds it once and hands the relevant section to each
//! component.

use pulse_core::constants::*;
use pulse_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Event bus settings
    pub bus: BusSettings,

    /// Normalizer and batching settings
    pub normalizer: NormalizerSettings,

    /// Logging settings
    pub logging: LogSettings,
}

/// Settings that affect how the event bus retains events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BusSettings {
    /// Maximum number of events kept in the retention buffer
    pub max_buffer_size: usize,
}

/// Settings that affect normalization, deduplication and batching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizerSettings {
    /// Window during which repeats of the same dedup key are dropped
    pub dedup_window_ms: u64,

    /// Dedup table size above which stale entries are collected
    pub dedup_gc_threshold: usize,

    /// Number of pending events that triggers an immediate flush
    pub batch_size: usize,

    /// Debounce delay before a partial batch is flushed
    pub batch_delay_ms: u64,

    /// Source assigned to events that arrive without one
    pub default_source: String,

    /// Environment tag added to every normalized event
    pub environment: String,

    /// Event types that are always dropped as noise
    pub noise_types: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    /// Default filter directive when `PULSE_LOG` is not set
    pub level: String,
}

impl Config {
    /// Check the invariants every component relies on
    pub fn validate(&self) -> Result<()> {
        if self.bus.max_buffer_size == 0 {
            return Err(Error::configuration("bus.max_buffer_size must be at least 1"));
        }
        if self.normalizer.batch_size == 0 {
            return Err(Error::configuration("normalizer.batch_size must be at least 1"));
        }
        if self.normalizer.dedup_gc_threshold == 0 {
            return Err(Error::configuration(
                "normalizer.dedup_gc_threshold must be at least 1",
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(Error::configuration("logging.level must not be empty"));
        }
        Ok(())
    }
}

impl NormalizerSettings {
    pub fn dedup_window(&self) -> Duration {
        Duration::from_millis(self.dedup_window_ms)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            dedup_window_ms: DEFAULT_DEDUP_WINDOW_MS,
            dedup_gc_threshold: DEFAULT_DEDUP_GC_THRESHOLD,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay_ms: DEFAULT_BATCH_DELAY_MS,
            default_source: DEFAULT_SOURCE.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            noise_types: vec![EDITOR_POINTER_MOVED.to_string()],
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}
