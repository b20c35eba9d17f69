//! Bearer tokens and where the client gets them

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::error::AuthError;

/// Session token attached as `Authorization: Bearer ...`.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub access_token: String,
    /// `None` when the issuer did not say.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: None,
        }
    }

    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub(crate) fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(exp) if now >= exp)
    }
}

/// Hands the [`EnvmonClient`](crate::EnvmonClient) a token before each
/// request. Session storage and renewal belong to the implementation.
///
/// ```ignore
/// #[async_trait]
/// impl TokenProvider for SessionStore {
///     async fn get_token(&self, _api_url: &str) -> Result<AccessToken, AuthError> {
///         self.current().ok_or(AuthError::Unauthenticated)
///     }
/// }
/// ```
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_token(&self, api_url: &str) -> Result<AccessToken, AuthError>;
}

/// Always answers with one fixed token, until it expires.
///
/// ```
/// use envmon_lib::auth::StaticTokenProvider;
///
/// let provider = StaticTokenProvider::new("session-token");
/// ```
#[derive(Debug, Clone)]
pub struct StaticTokenProvider(AccessToken);

impl StaticTokenProvider {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self(AccessToken::new(access_token))
    }
}

impl From<AccessToken> for StaticTokenProvider {
    fn from(token: AccessToken) -> Self {
        Self(token)
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self, _api_url: &str) -> Result<AccessToken, AuthError> {
        if self.0.is_expired_at(Utc::now()) {
            return Err(AuthError::TokenExpired {
                message: "static token is past its expiry".to_string(),
            });
        }
        Ok(self.0.clone())
    }
}
