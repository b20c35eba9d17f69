//! Fetched pages tagged with their cache provenance

use chrono::DateTime;
use chrono::Utc;

use crate::cache::CachedValue;

/// Whether a value came from the query cache or the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    /// Fetched just now; the body is cached unless the TTL is zero.
    Miss,
}

impl CacheStatus {
    pub fn is_hit(self) -> bool {
        self == Self::Hit
    }

    pub fn is_miss(self) -> bool {
        self == Self::Miss
    }
}

/// A decoded value plus the cache entry it was decoded from.
///
/// ```ignore
/// let response = query.fetch_page::<NodeData>("/nodes", &request).await?;
/// if response.is_cached() {
///     log::debug!("page fetched at {}", response.fetched_at);
/// }
/// let page = response.into_inner();
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    data: T,
    pub cache: CacheStatus,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl<T> Response<T> {
    pub(crate) fn new(data: T, cache: CacheStatus, entry: &CachedValue) -> Self {
        Self {
            data,
            cache,
            fetched_at: entry.created_at,
            expires_at: entry.expires_at,
        }
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_hit()
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}
