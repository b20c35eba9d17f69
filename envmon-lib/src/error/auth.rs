//! Authentication error types

/// Errors raised by a [`TokenProvider`](crate::auth::TokenProvider).
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No usable session or token is available.
    #[error("Not authenticated")]
    Unauthenticated,

    /// Access token expired and could not be renewed.
    #[error("Token expired: {message}")]
    TokenExpired { message: String },

    /// The provider itself failed (storage, remote identity service, ...).
    #[error("Token provider failed: {0}")]
    Provider(String),
}
