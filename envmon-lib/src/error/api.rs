//! API error types

use std::time::Duration;

use super::FetchErrorKind;

/// Failures of a single call to the monitoring REST API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The body did not decode into the expected shape. `body` holds the raw
    /// text when it was valid UTF-8.
    #[error("Response parse error: {message}")]
    Parse { message: String, body: Option<String> },
}

impl ApiError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: None,
        }
    }

    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Where the failure sits in the table error taxonomy.
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Http { status, .. } => FetchErrorKind::Server { status: *status },
            Self::Network(e) => e
                .status()
                .map_or(FetchErrorKind::Network, |status| FetchErrorKind::Server {
                    status: status.as_u16(),
                }),
            Self::Timeout(_) | Self::InvalidUrl(_) => FetchErrorKind::Network,
            Self::Parse { .. } => FetchErrorKind::Decode,
        }
    }
}
