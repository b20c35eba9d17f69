//! Shared query cache handle

use std::collections::VecDeque;
use std::sync::Arc;

use log::debug;
use tokio::sync::Mutex;
use tokio::sync::broadcast;

use super::CacheConfig;
use super::CacheProvider;
use super::CachedValue;
use super::InMemoryCache;
use crate::api::query::QueryKey;

/// Why the whole cache is being revalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevalidateReason {
    /// The application window regained focus.
    Focus,
    /// The network connection came back.
    Reconnect,
}

/// Notification published whenever cached pages are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// Every key starting with `prefix` was dropped.
    Invalidated {
        /// Literal key prefix.
        prefix: String,
    },
    /// Every entry was dropped for revalidation.
    Revalidate {
        /// What triggered the revalidation.
        reason: RevalidateReason,
    },
}

impl CacheEvent {
    /// Returns `true` if a table showing `key` should refetch.
    pub fn affects(&self, key: &QueryKey) -> bool {
        match self {
            CacheEvent::Invalidated { prefix } => key.starts_with(prefix),
            CacheEvent::Revalidate { .. } => true,
        }
    }
}

/// Process-wide cache of fetched pages, keyed by [`QueryKey`].
///
/// The cache is an explicit object: build one at startup (or one per test)
/// and hand clones to the client and every table. Clones share storage and
/// the event channel.
///
/// # Example
///
/// ```ignore
/// let cache = QueryCache::new();
///
/// // after DELETE /nodes/42/companies/7 succeeded:
/// cache.invalidate_prefix("/nodes/42/companies").await;
/// ```
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<QueryCacheInner>,
}

struct QueryCacheInner {
    provider: Arc<dyn CacheProvider>,
    config: CacheConfig,
    events: broadcast::Sender<CacheEvent>,
    log: Mutex<InvalidationLog>,
}

/// Position in the cache's invalidation history.
///
/// Taken before a request goes out; a body fetched under an older
/// generation is not stored if a matching invalidation happened since.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// Recent invalidations, newest last. `None` drops everything.
#[derive(Debug, Default)]
struct InvalidationLog {
    current: u64,
    /// Highest generation no longer in `recent`.
    forgotten: u64,
    recent: VecDeque<(u64, Option<String>)>,
}

impl InvalidationLog {
    fn record(&mut self, prefix: Option<String>, capacity: usize) {
        self.current += 1;
        self.recent.push_back((self.current, prefix));
        while self.recent.len() > capacity {
            if let Some((generation, _)) = self.recent.pop_front() {
                self.forgotten = generation;
            }
        }
    }

    /// Whether `key` was dropped after `since`.
    fn dropped_since(&self, key: &QueryKey, since: Generation) -> bool {
        if since.0 < self.forgotten {
            return true;
        }
        self.recent
            .iter()
            .filter(|(generation, _)| *generation > since.0)
            .any(|(_, prefix)| prefix.as_deref().is_none_or(|p| key.starts_with(p)))
    }
}

impl QueryCache {
    /// Creates an in-memory cache with default settings.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates an in-memory cache with the given settings.
    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_provider(InMemoryCache::new(), config)
    }

    /// Creates a cache over a custom provider.
    pub fn with_provider(provider: impl CacheProvider + 'static, config: CacheConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(QueryCacheInner {
                provider: Arc::new(provider),
                log: Mutex::new(InvalidationLog::default()),
                config,
                events,
            }),
        }
    }

    /// Returns the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Returns the unexpired entry for `key`.
    pub async fn get(&self, key: &QueryKey) -> Option<CachedValue> {
        self.inner.provider.get(key.as_str()).await
    }

    /// Stores a response body under `key` with the configured TTL.
    ///
    /// With a zero TTL nothing is stored.
    pub async fn put(&self, key: &QueryKey, data: Vec<u8>) -> CachedValue {
        let value = CachedValue::with_ttl(data, self.inner.config.query_ttl);
        if !self.inner.config.query_ttl.is_zero() {
            self.inner.provider.set(key.as_str(), value.clone()).await;
        }
        value
    }

    /// Current invalidation generation. Snapshot it before fetching and
    /// hand it to [`put_since`](Self::put_since).
    pub async fn generation(&self) -> Generation {
        Generation(self.inner.log.lock().await.current)
    }

    /// Like [`put`](Self::put), but stores nothing if `key` was invalidated
    /// after `since`. The returned entry describes the body either way.
    pub async fn put_since(&self, key: &QueryKey, data: Vec<u8>, since: Generation) -> CachedValue {
        let history = self.inner.log.lock().await;
        if history.dropped_since(key, since) {
            debug!("cache: not storing {}, invalidated while in flight", key);
            return CachedValue::with_ttl(data, self.inner.config.query_ttl);
        }
        // Held across the write so no invalidation slips in between.
        self.put(key, data).await
    }

    /// Returns `true` if an unexpired entry exists for `key`.
    pub async fn contains(&self, key: &QueryKey) -> bool {
        self.get(key).await.is_some()
    }

    /// Drops every entry whose key starts with `prefix` and notifies observers.
    ///
    /// Returns the number of entries dropped. Observers are notified even if
    /// nothing was cached, so tables that are mid-fetch still refetch.
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut history = self.inner.log.lock().await;
        history.record(Some(prefix.to_string()), self.log_capacity());
        let removed = self.inner.provider.remove_prefix(prefix).await;
        drop(history);
        debug!("cache: invalidated {} entries with prefix {}", removed, prefix);
        self.publish(CacheEvent::Invalidated {
            prefix: prefix.to_string(),
        });
        removed
    }

    /// Drops every entry when the trigger is enabled in the config.
    ///
    /// Returns `None` when the trigger is disabled.
    pub async fn revalidate(&self, reason: RevalidateReason) -> Option<usize> {
        let enabled = match reason {
            RevalidateReason::Focus => self.inner.config.revalidate_on_focus,
            RevalidateReason::Reconnect => self.inner.config.revalidate_on_reconnect,
        };
        if !enabled {
            return None;
        }

        let mut history = self.inner.log.lock().await;
        history.record(None, self.log_capacity());
        let keys = self.inner.provider.keys().await;
        self.inner.provider.clear().await;
        drop(history);
        debug!("cache: revalidating {} entries on {:?}", keys.len(), reason);
        self.publish(CacheEvent::Revalidate { reason });
        Some(keys.len())
    }

    /// Returns all stored keys.
    pub async fn keys(&self) -> Vec<String> {
        self.inner.provider.keys().await
    }

    /// Removes expired entries.
    pub async fn gc(&self) -> usize {
        self.inner.provider.gc().await
    }

    /// Subscribes to invalidation events.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    fn log_capacity(&self) -> usize {
        self.inner.config.event_capacity.max(1)
    }

    fn publish(&self, event: CacheEvent) {
        // No receivers is fine: nobody is showing the data.
        let _ = self.inner.events.send(event);
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::query::PageRequest;
    use crate::api::query::SortSpec;

    fn key(base: &str) -> QueryKey {
        QueryKey::derive(base, &PageRequest::new(SortSpec::asc("name")))
    }

    #[tokio::test]
    async fn test_invalidate_prefix_publishes_event() {
        let cache = QueryCache::new();
        let mut events = cache.subscribe();
        let k42 = key("/nodes/42/companies");
        let k99 = key("/nodes/99/companies");
        cache.put(&k42, b"{}".to_vec()).await;
        cache.put(&k99, b"{}".to_vec()).await;

        assert_eq!(cache.invalidate_prefix("/nodes/42/companies").await, 1);
        assert!(!cache.contains(&k42).await);
        assert!(cache.contains(&k99).await);

        let event = events.recv().await.unwrap();
        assert!(event.affects(&k42));
        assert!(!event.affects(&k99));
    }

    #[tokio::test]
    async fn test_revalidate_respects_config() {
        let cache = QueryCache::with_config(CacheConfig::default().with_revalidate_on_focus(false));
        cache.put(&key("/nodes"), b"{}".to_vec()).await;

        assert_eq!(cache.revalidate(RevalidateReason::Focus).await, None);
        assert!(cache.contains(&key("/nodes")).await);

        assert_eq!(cache.revalidate(RevalidateReason::Reconnect).await, Some(1));
        assert!(cache.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_zero_ttl_stores_nothing() {
        let cache = QueryCache::with_config(CacheConfig::no_cache());
        cache.put(&key("/nodes"), b"{}".to_vec()).await;
        assert!(!cache.contains(&key("/nodes")).await);
    }

    #[tokio::test]
    async fn test_put_since_skips_keys_invalidated_in_flight() {
        let cache = QueryCache::new();
        let k42 = key("/nodes/42/companies");
        let k99 = key("/nodes/99/companies");
        let before = cache.generation().await;

        cache.invalidate_prefix("/nodes/42/companies").await;
        cache.put_since(&k42, b"{}".to_vec(), before).await;
        cache.put_since(&k99, b"{}".to_vec(), before).await;

        assert!(!cache.contains(&k42).await);
        assert!(cache.contains(&k99).await);

        let after = cache.generation().await;
        cache.put_since(&k42, b"{}".to_vec(), after).await;
        assert!(cache.contains(&k42).await);
    }

    #[tokio::test]
    async fn test_put_since_skips_everything_after_revalidate() {
        let cache = QueryCache::new();
        let before = cache.generation().await;
        assert_eq!(cache.revalidate(RevalidateReason::Reconnect).await, Some(0));

        cache.put_since(&key("/nodes"), b"{}".to_vec(), before).await;
        assert!(!cache.contains(&key("/nodes")).await);
    }

    #[tokio::test]
    async fn test_put_since_is_conservative_once_history_is_trimmed() {
        let cache = QueryCache::with_config(CacheConfig::default().with_event_capacity(1));
        let before = cache.generation().await;
        cache.invalidate_prefix("/companies").await;
        cache.invalidate_prefix("/companies").await;

        cache.put_since(&key("/nodes"), b"{}".to_vec(), before).await;
        assert!(!cache.contains(&key("/nodes")).await);
    }

    #[test]
    fn test_revalidate_event_affects_everything() {
        let event = CacheEvent::Revalidate {
            reason: RevalidateReason::Focus,
        };
        assert!(event.affects(&key("/companies/1/nodes")));
    }
}
