//! Main EnvmonClient

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use log::warn;
use reqwest::Client;
use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::api::query::RemoteCollectionQuery;
use crate::api::query::Transport;
use crate::auth::TokenProvider;
use crate::cache::QueryCache;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::error::Error;
use crate::retry::RetryConfig;

/// Client for the environmental-monitoring REST API.
///
/// This client is cheap to clone (uses `Arc` internally) and can be shared
/// across tasks. It owns a handle to the [`QueryCache`] so that mutations can
/// invalidate the pages tables are showing.
///
/// # Example
///
/// ```ignore
/// use envmon_lib::{EnvmonClient, auth::StaticTokenProvider};
///
/// let client = EnvmonClient::builder()
///     .url("http://localhost:3000/api")
///     .token_provider(StaticTokenProvider::new("session-token"))
///     .build()?;
///
/// let query = client.query();
/// ```
#[derive(Clone)]
pub struct EnvmonClient {
    inner: Arc<EnvmonClientInner>,
}

struct EnvmonClientInner {
    base_url: String,
    token_provider: Option<Arc<dyn TokenProvider>>,
    http_client: Client,
    timeout: Option<Duration>,
    retry: RetryConfig,
    cache: QueryCache,
}

impl EnvmonClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> EnvmonClientBuilder<Missing> {
        EnvmonClientBuilder::new()
    }

    /// Creates a builder pointed at the API of `config`.
    pub fn from_config(config: &ApiConfig) -> EnvmonClientBuilder<Set<String>> {
        EnvmonClientBuilder::new().url(config.api_url())
    }

    /// Returns the API base URL.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Returns the shared query cache.
    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    /// Returns the retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.inner.retry
    }

    /// Returns a collection query layer that fetches through this client.
    pub fn query(&self) -> RemoteCollectionQuery {
        RemoteCollectionQuery::new(self.clone(), self.inner.cache.clone())
    }

    /// Fetches a JSON document, e.g. a summary endpoint.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let response = self.request(Method::GET, path, None).await?;
        response.json().await.map_err(|e| Error::Api(ApiError::parse(e.to_string())))
    }

    /// Resolves `path` against the API base URL.
    ///
    /// Absolute URLs are returned unchanged.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.inner.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Makes an HTTP request with retry logic.
    ///
    /// Returns the response of the first 2xx answer; any other status ends as
    /// [`ApiError::Http`].
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, Error> {
        let url = self.url_for(path);
        let retry = &self.inner.retry;
        let mut attempts = 0;

        loop {
            let result = self.send_once(method.clone(), &url, body).await;

            let retry_after = match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!("http: {} {} -> {}", method, url, status.as_u16());
                        return Ok(response);
                    }
                    if !retry.retries_status(status, attempts) {
                        let message = response.text().await.unwrap_or_default();
                        return Err(Error::Api(ApiError::http(status.as_u16(), message)));
                    }
                    parse_retry_after(&response)
                }
                Err(Error::Api(ApiError::Network(e))) if retry.retries_network(attempts) => {
                    warn!("http: {} {} failed: {}", method, url, e);
                    None
                }
                Err(e) => return Err(e),
            };

            let wait = retry.delay_for(attempts, retry_after);
            attempts += 1;
            warn!(
                "http: retrying {} {} in {:?} (attempt {}/{})",
                method, url, wait, attempts, retry.max_retries
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Inner request method without retry logic.
    async fn send_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, Error> {
        let mut request = self
            .inner
            .http_client
            .request(method, url)
            .header("Accept", "application/json");

        if let Some(provider) = &self.inner.token_provider {
            let token = provider.get_token(&self.inner.base_url).await?;
            request = request.bearer_auth(&token.access_token);
        }

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Api(ApiError::Timeout(self.inner.timeout.unwrap_or_default()))
            } else {
                Error::Api(ApiError::Network(e))
            }
        })
    }
}

#[async_trait]
impl Transport for EnvmonClient {
    async fn get(&self, path: &str) -> Result<Vec<u8>, Error> {
        let response = self.request(Method::GET, path, None).await?;
        let bytes = response.bytes().await.map_err(ApiError::from)?;
        Ok(bytes.to_vec())
    }
}

impl std::fmt::Debug for EnvmonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvmonClient")
            .field("base_url", &self.inner.base_url)
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

fn parse_retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get("Retry-After")?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing an [`EnvmonClient`].
///
/// Uses the typestate pattern so the API URL must be set before `build`.
///
/// # Example
///
/// ```ignore
/// let client = EnvmonClient::builder()
///     .url("https://monitor.example.org/api")
///     .timeout(Duration::from_secs(30))
///     .retry(RetryConfig::no_retry())
///     .cache(cache.clone())
///     .build()?;
/// ```
pub struct EnvmonClientBuilder<Url> {
    url: Url,
    token_provider: Option<Arc<dyn TokenProvider>>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry: RetryConfig,
    cache: Option<QueryCache>,
    http_client: Option<Client>,
}

impl EnvmonClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            token_provider: None,
            timeout: None,
            connect_timeout: None,
            retry: RetryConfig::default(),
            cache: None,
            http_client: None,
        }
    }

    /// Sets the API base URL, e.g. `http://localhost:3000/api`.
    pub fn url(self, url: impl Into<String>) -> EnvmonClientBuilder<Set<String>> {
        EnvmonClientBuilder {
            url: Set(url.into()),
            token_provider: self.token_provider,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            retry: self.retry,
            cache: self.cache,
            http_client: self.http_client,
        }
    }
}

impl Default for EnvmonClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> EnvmonClientBuilder<U> {
    /// Sets the token provider used to authorise requests.
    pub fn token_provider<T: TokenProvider + 'static>(mut self, provider: T) -> Self {
        self.token_provider = Some(Arc::new(provider));
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the retry behaviour.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Shares an existing query cache with this client.
    ///
    /// If not set, a fresh in-memory cache is created.
    pub fn cache(mut self, cache: QueryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl EnvmonClientBuilder<Set<String>> {
    /// Builds the [`EnvmonClient`].
    pub fn build(self) -> Result<EnvmonClient, Error> {
        let base_url = self.url.0.trim_end_matches('/').to_string();
        if url::Url::parse(&base_url).is_err() {
            return Err(Error::Api(ApiError::InvalidUrl(base_url)));
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build().map_err(ApiError::from)?
            }
        };

        Ok(EnvmonClient {
            inner: Arc::new(EnvmonClientInner {
                base_url,
                token_provider: self.token_provider,
                http_client,
                timeout: self.timeout,
                retry: self.retry,
                cache: self.cache.unwrap_or_default(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_paths() {
        let client = EnvmonClient::builder()
            .url("http://localhost:3000/api/")
            .build()
            .unwrap();
        assert_eq!(client.url_for("/nodes?page=1"), "http://localhost:3000/api/nodes?page=1");
        assert_eq!(client.url_for("nodes"), "http://localhost:3000/api/nodes");
        assert_eq!(client.url_for("https://other.example/x"), "https://other.example/x");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = EnvmonClient::builder().url("/api").build();
        assert!(matches!(result, Err(Error::Api(ApiError::InvalidUrl(_)))));
    }

    #[test]
    fn test_from_config_uses_api_url() {
        let client = EnvmonClient::from_config(&ApiConfig::development()).build().unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api");
    }
}
