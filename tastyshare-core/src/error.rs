use thiserror::Error;

/// Failure reported by a [`Transport`](crate::http::Transport) before any
/// HTTP status was received.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid multipart part: {0}")]
    InvalidPart(String),

    #[error("No mock response for {method} {path}")]
    NoMockResponse { method: String, path: String },
}

/// Uniform error shape for every API call made through
/// [`HttpClient`](crate::http::HttpClient).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 401 received while a session existed. The session has already been
    /// cleared and navigation to the login page issued; callers must stop.
    #[error("Your session has expired. Please log in again.")]
    SessionExpired,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Network error. Please try again.")]
    Network(String),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message from the server body when there was one, otherwise `fallback`.
    ///
    /// Network and decode failures always use the fallback so users see the
    /// page-specific "please try again" text instead of transport details.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            ApiError::Server { message, .. }
            | ApiError::Unauthorized(message)
            | ApiError::Forbidden(message)
            | ApiError::NotFound(message)
                if !message.is_empty() =>
            {
                message.clone()
            }
            ApiError::SessionExpired => self.to_string(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Local storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Local storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}
