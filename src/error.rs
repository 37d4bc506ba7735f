use thiserror::Error;

/// The single error kind surfaced by every public operation in this crate.
///
/// Transport failures, response-decode failures and body-adaptation failures
/// all normalize to this type; the original cause is preserved in the variant
/// payload so callers that need to distinguish (for example 4xx vs 5xx) can
/// inspect it.
#[derive(Debug, Error)]
pub enum RestClientError {
    #[error("HTTP transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Network timeout while calling: {url}")]
    Timeout { url: String },

    #[error("Connection failed to: {url} - {message}")]
    Connection { url: String, message: String },

    #[error("HTTP error status {status} from {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    #[error("Timed out after {waited_ms}ms waiting for a pooled connection: {url}")]
    PoolTimeout { url: String, waited_ms: u64 },

    #[error("Client has been closed")]
    PoolClosed,

    #[error("Response body was empty (URL: {url})")]
    EmptyBody { url: String },

    #[error("Failed to decode response as JSON: {message} (URL: {url})")]
    Decode { message: String, url: String },

    #[error("Failed to serialize request payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Cannot convert field '{field}' to a form value: {message}")]
    BodyAdaptation { field: String, message: String },

    #[error("Invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RestClientError {
    /// Create a network timeout error
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Create a connection failure error
    pub fn connection(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP error-status error
    pub fn status(status: u16, message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Status {
            status,
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a pool-checkout timeout error
    pub fn pool_timeout(url: impl Into<String>, waited_ms: u64) -> Self {
        Self::PoolTimeout {
            url: url.into(),
            waited_ms,
        }
    }

    /// Create an empty-response-body error
    pub fn empty_body(url: impl Into<String>) -> Self {
        Self::EmptyBody { url: url.into() }
    }

    /// Create a response-decode error
    pub fn decode(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create a body-adaptation error for a field that cannot be form-encoded
    pub fn body_adaptation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BodyAdaptation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error with context
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
