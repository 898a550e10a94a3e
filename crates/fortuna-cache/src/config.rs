//! Configuration for the TTL cache.

use std::time::Duration;

/// Default time-to-live for cache entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default interval for the periodic expiry sweep.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Configuration for the TTL cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Time-to-live applied to entries inserted without an explicit TTL.
    pub default_ttl: Duration,

    /// Interval for the periodic sweep of entries that are never read
    /// again after expiring.
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default TTL for inserted entries.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the periodic sweep interval.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }
}
