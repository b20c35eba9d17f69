//! Page cache
//!
//! Fetched pages are stored as raw response bodies under their
//! [`QueryKey`](crate::api::query::QueryKey) string. [`QueryCache`] is the
//! handle the rest of the crate uses; [`CacheProvider`] is the storage seam
//! behind it, with [`InMemoryCache`] as the only backend. Nothing survives
//! the process.

mod config;
mod memory;
mod query_cache;

pub use config::*;
pub use memory::*;
pub use query_cache::*;

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

/// A stored response body and its lifetime.
#[derive(Debug, Clone)]
pub struct CachedValue {
    /// Body exactly as the server sent it.
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CachedValue {
    /// Stores `data` now, valid for `ttl`.
    pub fn with_ttl(data: Vec<u8>, ttl: Duration) -> Self {
        let created_at = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            data,
            created_at,
            expires_at: created_at.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Returns `true` once `expires_at` is reached.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub(crate) fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Key/value storage for cached pages.
///
/// Keys are query keys; prefix removal is a plain string prefix match, so
/// `"/nodes/4"` also removes `"/nodes/42/..."`.
///
/// # Example
///
/// ```ignore
/// let store = InMemoryCache::new();
/// store.set("/nodes?page=1", CachedValue::with_ttl(body, Duration::from_secs(60))).await;
/// assert_eq!(store.remove_prefix("/nodes").await, 1);
/// ```
#[async_trait]
pub trait CacheProvider: Send + Sync {
    /// Returns the entry for `key` unless it is missing or expired.
    async fn get(&self, key: &str) -> Option<CachedValue>;

    /// Inserts or replaces the entry for `key`.
    async fn set(&self, key: &str, value: CachedValue);

    /// Drops every entry whose key starts with `prefix`; returns how many.
    async fn remove_prefix(&self, prefix: &str) -> usize;

    /// Every stored key, expired ones included.
    async fn keys(&self) -> Vec<String>;

    /// Drops everything.
    async fn clear(&self);

    /// Drops expired entries; returns how many.
    async fn gc(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry() {
        let value = CachedValue::with_ttl(Vec::new(), Duration::from_secs(60));
        assert!(!value.is_expired());
        assert!(value.is_expired_at(value.created_at + chrono::Duration::seconds(60)));
        assert!(CachedValue::with_ttl(Vec::new(), Duration::ZERO).is_expired());
    }
}
