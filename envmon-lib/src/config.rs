//! API endpoint configuration.
//!
//! The dashboard talks to a local backend during development and to a
//! deployment-provided URL otherwise.

use std::env;

use url::Url;

use crate::error::ConfigError;

/// Default number of rows per page in a paginated table.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Default map centre (latitude, longitude) for node maps.
pub const MAP_CENTER: (f64, f64) = (-7.519794, 110.082142);

/// Environment variable selecting the run mode.
pub const MODE_VAR: &str = "ENVMON_MODE";

/// Environment variable overriding the API base URL.
pub const API_URL_VAR: &str = "ENVMON_API_URL";

const DEVELOPMENT_API_URL: &str = "http://localhost:3000/api";
const DEVELOPMENT_HOST_URL: &str = "http://localhost:3000";

/// Run mode of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Local backend on port 3000.
    Development,
    /// Deployed backend, URL supplied by the environment.
    #[default]
    Production,
}

impl Mode {
    /// Parses a mode name; anything other than `development`/`dev` is production.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Mode::Development,
            _ => Mode::Production,
        }
    }

    /// Returns the mode name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }
}

/// Resolved API endpoint configuration.
///
/// # Example
///
/// ```
/// use envmon_lib::config::ApiConfig;
///
/// let config = ApiConfig::development();
/// assert_eq!(config.api_url(), "http://localhost:3000/api");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    mode: Mode,
    api_url: String,
    host_url: String,
}

impl ApiConfig {
    /// Configuration for the local development backend.
    pub fn development() -> Self {
        Self {
            mode: Mode::Development,
            api_url: DEVELOPMENT_API_URL.to_string(),
            host_url: DEVELOPMENT_HOST_URL.to_string(),
        }
    }

    /// Configuration for a deployed backend at `api_url`.
    ///
    /// The host URL is the API URL with its path removed.
    pub fn production(api_url: impl Into<String>) -> Result<Self, ConfigError> {
        Self::with_url(Mode::Production, api_url.into())
    }

    /// Reads `ENVMON_MODE` and `ENVMON_API_URL` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mode = env::var(MODE_VAR).map(|v| Mode::parse(&v)).unwrap_or_default();
        Self::resolve(mode, env::var(API_URL_VAR).ok())
    }

    /// Resolves a configuration from a mode and an optional URL override.
    pub fn resolve(mode: Mode, api_url: Option<String>) -> Result<Self, ConfigError> {
        match (mode, api_url.filter(|u| !u.trim().is_empty())) {
            (mode, Some(url)) => Self::with_url(mode, url),
            (Mode::Development, None) => Ok(Self::development()),
            (Mode::Production, None) => Err(ConfigError::MissingApiUrl {
                mode: mode.as_str().to_string(),
            }),
        }
    }

    fn with_url(mode: Mode, api_url: String) -> Result<Self, ConfigError> {
        let parsed = Url::parse(api_url.trim()).map_err(|e| ConfigError::InvalidUrl {
            url: api_url.clone(),
            reason: e.to_string(),
        })?;
        let host_url = parsed.origin().ascii_serialization();
        Ok(Self {
            mode,
            api_url: api_url.trim().trim_end_matches('/').to_string(),
            host_url,
        })
    }

    /// Returns the run mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the API base URL (no trailing slash).
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Returns the host URL serving static assets.
    pub fn host_url(&self) -> &str {
        &self.host_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_defaults_to_localhost() {
        let config = ApiConfig::resolve(Mode::Development, None).unwrap();
        assert_eq!(config.api_url(), "http://localhost:3000/api");
        assert_eq!(config.host_url(), "http://localhost:3000");
    }

    #[test]
    fn test_production_requires_url() {
        let err = ApiConfig::resolve(Mode::Production, None).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingApiUrl {
                mode: "production".to_string()
            }
        );
    }

    #[test]
    fn test_override_strips_trailing_slash() {
        let config =
            ApiConfig::resolve(Mode::Production, Some("https://monitor.example.org/api/".into()))
                .unwrap();
        assert_eq!(config.api_url(), "https://monitor.example.org/api");
        assert_eq!(config.host_url(), "https://monitor.example.org");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = ApiConfig::production("not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(Mode::parse("Development"), Mode::Development);
        assert_eq!(Mode::parse("dev"), Mode::Development);
        assert_eq!(Mode::parse("staging"), Mode::Production);
    }
}
