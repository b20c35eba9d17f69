//! Error types

mod api;
mod auth;
mod column;
mod config;

pub use api::*;
pub use auth::*;
pub use column::*;
pub use config::*;

/// Top-level error returned by the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// REST API failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Token provider failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Invalid column definitions.
    #[error(transparent)]
    Column(#[from] ColumnError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Classifies the error for display in a table's error state.
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Error::Api(api) => api.kind(),
            Error::Auth(_) => FetchErrorKind::Server { status: 401 },
            Error::Column(_) | Error::Config(_) => FetchErrorKind::Decode,
        }
    }
}

/// Coarse error taxonomy shown to users of a data table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The request failed to complete.
    Network,
    /// The server answered with a non-2xx status.
    Server {
        /// HTTP status code.
        status: u16,
    },
    /// The response body did not match the expected page shape.
    Decode,
}

/// Clonable snapshot of a fetch failure, kept in a table's error state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableError {
    /// Error classification.
    pub kind: FetchErrorKind,
    /// Human-readable message.
    pub message: String,
}

impl From<&Error> for TableError {
    fn from(error: &Error) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            FetchErrorKind::Network => write!(f, "network error: {}", self.message),
            FetchErrorKind::Server { status } => write!(f, "server error ({}): {}", status, self.message),
            FetchErrorKind::Decode => write!(f, "invalid response: {}", self.message),
        }
    }
}
