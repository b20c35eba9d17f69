//! Cache configuration

use std::time::Duration;

/// Configuration for the query cache.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use envmon_lib::cache::CacheConfig;
///
/// let config = CacheConfig::default()
///     .with_query_ttl(Duration::from_secs(60))
///     .with_revalidate_on_focus(false);
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a fetched page is served from cache before refetching.
    ///
    /// Default: 5 minutes
    pub query_ttl: Duration,

    /// Drop cached pages when the application regains focus.
    ///
    /// Default: true
    pub revalidate_on_focus: bool,

    /// Drop cached pages when the network connection comes back.
    ///
    /// Default: true
    pub revalidate_on_reconnect: bool,

    /// Capacity of the invalidation event channel.
    ///
    /// Default: 64
    pub event_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            query_ttl: Duration::from_secs(300),
            revalidate_on_focus: true,
            revalidate_on_reconnect: true,
            event_capacity: 64,
        }
    }
}

impl CacheConfig {
    /// Creates a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the query TTL.
    pub fn with_query_ttl(mut self, ttl: Duration) -> Self {
        self.query_ttl = ttl;
        self
    }

    /// Enables or disables revalidation on focus.
    pub fn with_revalidate_on_focus(mut self, enabled: bool) -> Self {
        self.revalidate_on_focus = enabled;
        self
    }

    /// Enables or disables revalidation on reconnect.
    pub fn with_revalidate_on_reconnect(mut self, enabled: bool) -> Self {
        self.revalidate_on_reconnect = enabled;
        self
    }

    /// Sets the event channel capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Creates a config with no caching (zero TTL).
    pub fn no_cache() -> Self {
        Self {
            query_ttl: Duration::ZERO,
            ..Self::default()
        }
    }
}
