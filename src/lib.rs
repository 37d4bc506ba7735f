//! Pooled REST client convenience layer
//!
//! This library wires a single pooled HTTP client per process - configured
//! timeouts, fixed default headers, a bounded retry policy - and exposes
//! typed request helpers that adapt payloads for the negotiated content type
//! (JSON, urlencoded form fields or URL query strings) and decode JSON
//! responses into caller-specified shapes. Every failure surfaces as one
//! error kind, [`RestClientError`], with the original cause attached.
//!
//! # Examples
//!
//! ```rust,no_run
//! use rest_api_client::{ClientConfig, RestClient, RestClientError};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Account {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), RestClientError> {
//!     let config = ClientConfig::load().await?;
//!     let client = RestClient::from_config(&config)?;
//!
//!     let account: Account = client
//!         .get_for_object("https://api.example.com/accounts/1")
//!         .await?;
//!     println!("{}: {}", account.id, account.name);
//!
//!     client.close();
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod transport;

// Re-export commonly used types for convenience
pub use client::RestClient;
pub use client::body::{AdaptedBody, ContentType, FormMode};
pub use config::ClientConfig;
pub use error::RestClientError;
pub use transport::{PooledClient, RawResponse, RequestSpec, RetryPolicy};

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
