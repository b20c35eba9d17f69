//! Retry policy of the HTTP request loop.

use std::time::Duration;

use reqwest::StatusCode;

/// When and how long the client waits before re-sending a request.
///
/// Retries happen inside one request; a table whose fetch failed stays in
/// its error state until it is retried explicitly.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use envmon_lib::RetryConfig;
///
/// let retry = RetryConfig::default()
///     .max_retries(5)
///     .initial_delay(Duration::from_millis(250));
/// assert_eq!(retry.max_retries, 5);
///
/// assert_eq!(RetryConfig::no_retry().max_retries, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Wait before the first retry; doubles on each further retry.
    pub initial_delay: Duration,
    /// Upper bound for any single wait, `Retry-After` included.
    pub max_delay: Duration,
    /// Retry `429 Too Many Requests`.
    pub retry_on_429: bool,
    /// Retry `5xx` answers.
    pub retry_on_5xx: bool,
    /// Retry requests that never got an answer.
    pub retry_on_network: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            retry_on_429: true,
            retry_on_5xx: true,
            retry_on_network: true,
        }
    }
}

impl RetryConfig {
    /// Sends every request exactly once.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            retry_on_429: false,
            retry_on_5xx: false,
            retry_on_network: false,
            ..Self::default()
        }
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Whether a response with `status` may be re-sent after `attempts` retries.
    pub(crate) fn retries_status(&self, status: StatusCode, attempts: u32) -> bool {
        let retryable = (status == StatusCode::TOO_MANY_REQUESTS && self.retry_on_429)
            || (status.is_server_error() && self.retry_on_5xx);
        retryable && attempts < self.max_retries
    }

    /// Whether a request without an answer may be re-sent after `attempts` retries.
    pub(crate) fn retries_network(&self, attempts: u32) -> bool {
        self.retry_on_network && attempts < self.max_retries
    }

    /// Wait before retry number `attempt` (0-based). A server-sent
    /// `Retry-After` wins over the backoff but is still capped.
    pub(crate) fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let backoff = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        retry_after.unwrap_or(backoff).min(self.max_delay)
    }
}
