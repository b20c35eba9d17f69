//! DashMap-backed page store

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::CacheProvider;
use super::CachedValue;

/// Process-local page store. Expired entries are dropped lazily on read and
/// in bulk by [`gc`](CacheProvider::gc).
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: DashMap<String, CachedValue>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn drop_where(&self, mut pred: impl FnMut(&str, &CachedValue) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, value| !pred(key, value));
        before.saturating_sub(self.entries.len())
    }
}

#[async_trait]
impl CacheProvider for InMemoryCache {
    async fn get(&self, key: &str) -> Option<CachedValue> {
        let hit = self.entries.get(key).map(|entry| entry.value().clone())?;
        if hit.is_expired() {
            self.entries.remove_if(key, |_, value| value.is_expired());
            return None;
        }
        Some(hit)
    }

    async fn set(&self, key: &str, value: CachedValue) {
        self.entries.insert(key.to_owned(), value);
    }

    async fn remove_prefix(&self, prefix: &str) -> usize {
        self.drop_where(|key, _| key.starts_with(prefix))
    }

    async fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    async fn clear(&self) {
        self.entries.clear();
    }

    async fn gc(&self) -> usize {
        let now = Utc::now();
        self.drop_where(|_, value| value.is_expired_at(now))
    }
}
