//! Configuration Module
//!
//! Builder-style cache options, optionally loaded from environment variables.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::{CacheError, Result};

/// Environment variable holding the sweep interval in milliseconds.
pub const SWEEP_INTERVAL_ENV: &str = "TEMPUS_SWEEP_INTERVAL_MS";
/// Environment variable holding the capacity bound.
pub const MAX_ENTRIES_ENV: &str = "TEMPUS_MAX_ENTRIES";

/// Cache construction options.
///
/// Every option is independent and optional; zero disables the feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Period of the background expiration sweep, zero = no janitor
    pub sweep_interval: Duration,
    /// Maximum number of live entries before LRU eviction, zero = unbounded
    pub max_entries: usize,
}

impl CacheConfig {
    /// Creates a config with the janitor disabled and no capacity bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the background sweep when `interval` is non-zero.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Enables capacity-bounded LRU eviction when `max_entries` is non-zero.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Returns true if a background sweep should be started.
    pub fn sweep_enabled(&self) -> bool {
        !self.sweep_interval.is_zero()
    }

    /// Loads the config from environment variables, rejecting values that
    /// fail to parse.
    ///
    /// # Environment Variables
    /// - `TEMPUS_SWEEP_INTERVAL_MS` - Sweep period in milliseconds (default: 0)
    /// - `TEMPUS_MAX_ENTRIES` - Capacity bound (default: 0)
    pub fn try_from_env() -> Result<Self> {
        let sweep_ms: u64 = parse_var(SWEEP_INTERVAL_ENV)?.unwrap_or(0);
        let max_entries: usize = parse_var(MAX_ENTRIES_ENV)?.unwrap_or(0);

        Ok(Self {
            sweep_interval: Duration::from_millis(sweep_ms),
            max_entries,
        })
    }

    /// Loads the config from environment variables, falling back to the
    /// default for any value that fails to parse.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let sweep_interval = parse_var::<u64>(SWEEP_INTERVAL_ENV)
            .unwrap_or_else(|e| {
                warn!("{}, sweep disabled", e);
                None
            })
            .map(Duration::from_millis)
            .unwrap_or(defaults.sweep_interval);
        let max_entries = parse_var::<usize>(MAX_ENTRIES_ENV)
            .unwrap_or_else(|e| {
                warn!("{}, capacity unbounded", e);
                None
            })
            .unwrap_or(defaults.max_entries);

        Self {
            sweep_interval,
            max_entries,
        }
    }
}

/// Reads and parses one variable; `Ok(None)` when it is unset.
fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CacheError::InvalidConfig(format!("{}={}", name, raw))),
        Err(_) => Ok(None),
    }
}
