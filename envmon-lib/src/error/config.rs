//! Configuration error types

/// Errors raised while resolving [`ApiConfig`](crate::config::ApiConfig).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Production mode requires an explicit API URL.
    #[error("ENVMON_API_URL must be set when ENVMON_MODE is '{mode}'")]
    MissingApiUrl { mode: String },

    /// The configured URL could not be parsed.
    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
