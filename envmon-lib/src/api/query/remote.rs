//! Remote collection fetching through the query cache.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use log::trace;
use serde::de::DeserializeOwned;

use super::Page;
use super::PageRequest;
use super::QueryKey;
use crate::cache::QueryCache;
use crate::error::ApiError;
use crate::error::Error;
use crate::response::CacheStatus;
use crate::response::Response;

/// Performs the GET behind a collection fetch.
///
/// [`EnvmonClient`](crate::EnvmonClient) is the production implementation;
/// tests plug in scripted transports.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `path` (relative to the API base, query string included) and
    /// returns the raw response body of a 2xx response.
    async fn get(&self, path: &str) -> Result<Vec<u8>, Error>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, path: &str) -> Result<Vec<u8>, Error> {
        (**self).get(path).await
    }
}

/// Where a fetch may read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    /// Serve an unexpired cached page, otherwise go to the network.
    #[default]
    CacheFirst,
    /// Always go to the network and refresh the cache.
    NetworkOnly,
}

/// Fetches pages of a REST collection, caching them by [`QueryKey`].
///
/// Cheap to clone; clones share the transport and the cache.
///
/// # Example
///
/// ```ignore
/// let query = RemoteCollectionQuery::new(client.clone(), cache.clone());
/// let request = PageRequest::new(SortSpec::asc("name")).page(2).search(Some("kali"));
/// let page: Page<NodeData> = query.fetch_page("/nodes", &request).await?.into_inner();
/// ```
#[derive(Clone)]
pub struct RemoteCollectionQuery {
    transport: Arc<dyn Transport>,
    cache: QueryCache,
}

impl RemoteCollectionQuery {
    /// Creates a query layer over `transport` and `cache`.
    pub fn new(transport: impl Transport + 'static, cache: QueryCache) -> Self {
        Self {
            transport: Arc::new(transport),
            cache,
        }
    }

    /// Creates a query layer over an already shared transport.
    pub fn from_shared(transport: Arc<dyn Transport>, cache: QueryCache) -> Self {
        Self { transport, cache }
    }

    /// Returns the cache this query layer reads and fills.
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Fetches one page of `base_url` for `request`.
    pub async fn fetch_page<R: DeserializeOwned>(
        &self,
        base_url: &str,
        request: &PageRequest,
    ) -> Result<Response<Page<R>>, Error> {
        let key = QueryKey::derive(base_url, request);
        self.fetch(&key, FetchPolicy::CacheFirst).await
    }

    /// Fetches the page identified by `key`.
    pub async fn fetch<R: DeserializeOwned>(
        &self,
        key: &QueryKey,
        policy: FetchPolicy,
    ) -> Result<Response<Page<R>>, Error> {
        if policy == FetchPolicy::CacheFirst {
            if let Some(cached) = self.cache.get(key).await {
                match decode_page(&cached.data) {
                    Ok(page) => {
                        trace!("query: cache hit {}", key);
                        return Ok(Response::new(page, CacheStatus::Hit, &cached));
                    }
                    Err(e) => debug!("query: dropping undecodable cache entry {}: {}", key, e),
                }
            }
        }

        let generation = self.cache.generation().await;
        debug!("query: fetching {}", key);
        let body = self.transport.get(key.as_str()).await?;
        let page = decode_page(&body)?;
        let cached = self.cache.put_since(key, body, generation).await;
        Ok(Response::new(page, CacheStatus::Miss, &cached))
    }
}

impl std::fmt::Debug for RemoteCollectionQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCollectionQuery")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

fn decode_page<R: DeserializeOwned>(body: &[u8]) -> Result<Page<R>, Error> {
    serde_json::from_slice(body).map_err(|e| {
        Error::Api(ApiError::parse_with_body(
            e.to_string(),
            String::from_utf8_lossy(body).into_owned(),
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::api::query::SortSpec;
    use crate::error::FetchErrorKind;

    struct CountingTransport {
        calls: AtomicUsize,
        body: &'static str,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn get(&self, _path: &str) -> Result<Vec<u8>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.as_bytes().to_vec())
        }
    }

    fn transport(body: &'static str) -> Arc<CountingTransport> {
        Arc::new(CountingTransport {
            calls: AtomicUsize::new(0),
            body,
        })
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let transport = transport(r#"{"rows":["a","b"],"total":2}"#);
        let query = RemoteCollectionQuery::new(transport.clone(), QueryCache::new());
        let request = PageRequest::new(SortSpec::asc("name"));

        let first = query.fetch_page::<String>("/nodes", &request).await.unwrap();
        let second = query.fetch_page::<String>("/nodes", &request).await.unwrap();

        assert!(first.cache.is_miss());
        assert!(second.is_cached());
        assert_eq!(second.data().rows(), &["a".to_string(), "b".to_string()]);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_network_only_bypasses_cache() {
        let transport = transport(r#"{"rows":[],"total":0}"#);
        let query = RemoteCollectionQuery::new(transport.clone(), QueryCache::new());
        let key = QueryKey::derive("/nodes", &PageRequest::new(SortSpec::asc("name")));

        query.fetch::<String>(&key, FetchPolicy::CacheFirst).await.unwrap();
        query.fetch::<String>(&key, FetchPolicy::NetworkOnly).await.unwrap();

        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let transport = transport(r#"{"result":[]}"#);
        let query = RemoteCollectionQuery::new(transport, QueryCache::new());
        let request = PageRequest::new(SortSpec::asc("name"));

        let err = query.fetch_page::<String>("/nodes", &request).await.unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Decode);
        assert!(query.cache().keys().await.is_empty());
    }
}
