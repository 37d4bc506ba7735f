use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_CONNECTION_REQUEST_TIMEOUT_MS, DEFAULT_READ_TIMEOUT_MS,
};
use crate::error::RestClientError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{info, warn};

fn default_connect_timeout_ms() -> i64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

fn default_read_timeout_ms() -> i64 {
    DEFAULT_READ_TIMEOUT_MS
}

fn default_connection_request_timeout_ms() -> i64 {
    DEFAULT_CONNECTION_REQUEST_TIMEOUT_MS
}

/// Externally bound timeout settings for the pooled transport.
///
/// Values are milliseconds. A value of zero or below means "do not override
/// the transport's built-in default" - the corresponding accessor returns
/// `None` and the builder leaves that setting untouched.
///
/// Loaded once at startup and immutable afterwards; pool capacity and the
/// retry policy are compile-time constants, not part of this struct.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Connect timeout in milliseconds. External key: `rest.http.timeout`.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: i64,

    /// Read timeout in milliseconds (socket read, not total request time).
    /// External key: `rest.http.read.timeout`.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: i64,

    /// Maximum wait for a free pooled connection, in milliseconds. External
    /// key: `rest.http.connnection.request.timeout` (the upstream key carries
    /// this spelling).
    #[serde(default = "default_connection_request_timeout_ms")]
    pub connection_request_timeout_ms: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            connection_request_timeout_ms: default_connection_request_timeout_ms(),
        }
    }
}

fn timeout_from_ms(ms: i64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms as u64))
}

impl ClientConfig {
    /// Loads configuration from the default config file location, falling
    /// back to defaults when no file exists. Environment variables override
    /// file values.
    ///
    /// # Environment Variables
    /// - `REST_HTTP_TIMEOUT` - connect timeout in ms
    /// - `REST_HTTP_READ_TIMEOUT` - read timeout in ms
    /// - `REST_HTTP_CONNECTION_REQUEST_TIMEOUT` - pending-connection wait in ms
    pub async fn load() -> Result<Self, RestClientError> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            info!("Loading client config from {}", config_path.display());
            let content = fs::read_to_string(&config_path).await?;
            toml::from_str(&content)?
        } else {
            ClientConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from an explicit TOML file. Environment variables
    /// are not consulted.
    pub async fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, RestClientError> {
        let content = fs::read_to_string(path.as_ref()).await?;
        Ok(toml::from_str(&content)?)
    }

    /// Platform-specific config file location.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rest_api_client")
            .join("config.toml")
    }

    fn apply_env_overrides(&mut self) {
        if let Some(ms) = env_ms("REST_HTTP_TIMEOUT") {
            self.connect_timeout_ms = ms;
        }
        if let Some(ms) = env_ms("REST_HTTP_READ_TIMEOUT") {
            self.read_timeout_ms = ms;
        }
        if let Some(ms) = env_ms("REST_HTTP_CONNECTION_REQUEST_TIMEOUT") {
            self.connection_request_timeout_ms = ms;
        }
    }

    /// Effective connect timeout, `None` when the configured value is <= 0.
    pub fn connect_timeout(&self) -> Option<Duration> {
        timeout_from_ms(self.connect_timeout_ms)
    }

    /// Effective read timeout, `None` when the configured value is <= 0.
    pub fn read_timeout(&self) -> Option<Duration> {
        timeout_from_ms(self.read_timeout_ms)
    }

    /// Effective pending-connection wait, `None` when the configured value
    /// is <= 0 (callers then wait indefinitely for a pooled connection).
    pub fn connection_request_timeout(&self) -> Option<Duration> {
        timeout_from_ms(self.connection_request_timeout_ms)
    }
}

fn env_ms(var: &str) -> Option<i64> {
    let raw = std::env::var(var).ok()?;
    match raw.parse::<i64>() {
        Ok(ms) => Some(ms),
        Err(_) => {
            warn!("Ignoring {var}: '{raw}' is not a valid millisecond value");
            None
        }
    }
}
