//! Client configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Default API server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the TastyShare server, without a trailing slash.
    pub base_url: String,
    /// Directory holding the durable local store (session, draft, theme).
    pub state_dir: PathBuf,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            state_dir: Self::default_state_dir(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: Self::default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `TASTYSHARE_BASE_URL`: API server (default: "http://localhost:5000")
    /// - `TASTYSHARE_STATE_DIR`: local store directory (default: "~/.tastyshare")
    /// - `TASTYSHARE_TIMEOUT_SECS`: request timeout (default: 30)
    /// - `TASTYSHARE_USER_AGENT`: user agent string
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("TASTYSHARE_BASE_URL")
            .map(|v| normalize_base_url(&v))
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        url::Url::parse(&base_url).map_err(|_| ConfigError::InvalidValue {
            name: "TASTYSHARE_BASE_URL".to_string(),
            value: base_url.clone(),
        })?;

        let state_dir = env::var("TASTYSHARE_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_state_dir());

        let timeout = match env::var("TASTYSHARE_TIMEOUT_SECS") {
            Ok(v) => {
                let secs: u64 = v.parse().map_err(|_| ConfigError::InvalidValue {
                    name: "TASTYSHARE_TIMEOUT_SECS".to_string(),
                    value: v.clone(),
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let user_agent =
            env::var("TASTYSHARE_USER_AGENT").unwrap_or_else(|_| Self::default_user_agent());

        Ok(Self {
            base_url,
            state_dir,
            timeout,
            user_agent,
        })
    }

    /// Override the server URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    /// Override the state directory.
    pub fn with_state_dir(mut self, dir: PathBuf) -> Self {
        self.state_dir = dir;
        self
    }

    /// Get the default state directory: ~/.tastyshare
    pub fn default_state_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".tastyshare"))
            .unwrap_or_else(|| PathBuf::from("data/tastyshare"))
    }

    fn default_user_agent() -> String {
        format!("TastyShare-CLI/{}", env!("CARGO_PKG_VERSION"))
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
