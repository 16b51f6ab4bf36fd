//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Lifetime applied when `set` receives no explicit TTL
    pub default_ttl: Duration,
    /// Interval between background sweeps, None = no reaper
    pub sweep_interval: Option<Duration>,
}

impl CacheConfig {
    /// Creates a new CacheConfig with the given default TTL and sweep interval.
    ///
    /// A zero sweep interval is treated the same as no interval.
    pub fn new(default_ttl: Duration, sweep_interval: Option<Duration>) -> Self {
        Self {
            default_ttl,
            sweep_interval: sweep_interval.filter(|interval| !interval.is_zero()),
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds, 0 disables the reaper (default: 1)
    pub fn from_env() -> Self {
        let default_ttl = env_secs("DEFAULT_TTL").unwrap_or(300);
        let cleanup_interval = env_secs("CLEANUP_INTERVAL").unwrap_or(1);

        Self::new(
            Duration::from_secs(default_ttl),
            Some(Duration::from_secs(cleanup_interval)),
        )
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(300),
            sweep_interval: Some(Duration::from_secs(1)),
        }
    }
}

fn env_secs(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
