//! Centralized constants for transport sizing, retry policy and configuration defaults.
//!
//! Pool capacity and the retry policy are deliberately constants rather than
//! configuration: every deployment shares the same transport shape, and only
//! the timeouts are externally tunable (see [`crate::config::ClientConfig`]).

/// Maximum pooled connections across all routes combined.
pub const MAX_TOTAL_CONNECTIONS: usize = 5000;

/// Maximum pooled connections kept alive per route/host.
pub const MAX_CONNECTIONS_PER_ROUTE: usize = 100;

/// Maximum transport-level attempts for a single request (1 initial + 1 retry).
pub const RETRY_MAX_ATTEMPTS: u32 = 2;

/// Default connect timeout in milliseconds (`rest.http.timeout`).
pub const DEFAULT_CONNECT_TIMEOUT_MS: i64 = 15_000;

/// Default read timeout in milliseconds (`rest.http.read.timeout`).
pub const DEFAULT_READ_TIMEOUT_MS: i64 = 60_000;

/// Default pending-connection wait in milliseconds
/// (`rest.http.connnection.request.timeout`). Kept short on purpose: when the
/// pool is exhausted, a long wait here stalls every caller behind it.
pub const DEFAULT_CONNECTION_REQUEST_TIMEOUT_MS: i64 = 200;

/// Fixed header values attached to every outgoing request.
pub mod default_headers {
    /// User-Agent presented to remote services.
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/31.0.1650.16 Safari/537.36";

    /// Accepted response encodings.
    pub const ACCEPT_ENCODING: &str = "gzip,deflate";

    /// Accepted response language.
    pub const ACCEPT_LANGUAGE: &str = "zh-CN";

    /// Connection handling hint.
    pub const CONNECTION: &str = "close";
}
