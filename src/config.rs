//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Row cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of log locations processed concurrently
    pub max_in_flight: usize,
    /// Path to the on-disk cache database (None = in-memory store)
    pub db_path: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `ROWCACHE_MAX_IN_FLIGHT` - Concurrent location limit (default: 8)
    /// - `ROWCACHE_DB` - Cache database path (default: unset, in-memory)
    pub fn from_env() -> Self {
        Self {
            max_in_flight: env::var("ROWCACHE_MAX_IN_FLIGHT")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(8),
            db_path: env::var("ROWCACHE_DB").ok().map(PathBuf::from),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_in_flight: 8,
            db_path: None,
        }
    }
}
