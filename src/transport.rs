//! Pooled transport construction and request execution.
//!
//! One [`PooledClient`] is built per process and shared by every caller; the
//! underlying reqwest pool arbitrates per-route connection reuse while the
//! checkout gate here bounds total concurrency and applies the
//! pending-connection wait. The retry policy is fixed at build time and never
//! replays timeouts or requests that already reached the wire.

use crate::client::body::AdaptedBody;
use crate::config::ClientConfig;
use crate::constants::{
    MAX_CONNECTIONS_PER_ROUTE, MAX_TOTAL_CONNECTIONS, RETRY_MAX_ATTEMPTS, default_headers,
};
use crate::error::RestClientError;
use reqwest::header::{
    ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue, USER_AGENT,
};
use reqwest::{Client, Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

/// One outbound call: everything needed to build and (if necessary) rebuild
/// the underlying request. Constructed per call and discarded afterwards.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: AdaptedBody,
}

/// A fully read response: status plus the complete body text. Responses are
/// always drained while the pooled connection is still checked out.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Bounded retry policy for transport-level failures.
///
/// Only connect-stage failures are ever replayed: a request that may have
/// reached the wire is not safe to repeat, and timeouts are already bounded
/// by configuration. Non-idempotent methods are excluded unless explicitly
/// opted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_non_idempotent: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: RETRY_MAX_ATTEMPTS,
            retry_non_idempotent: false,
        }
    }
}

impl RetryPolicy {
    fn allows(&self, method: &Method, attempt: u32, is_connect_failure: bool) -> bool {
        if attempt >= self.max_attempts {
            return false;
        }
        if !is_connect_failure {
            return false;
        }
        self.retry_non_idempotent || is_idempotent(method)
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(
        method.as_str(),
        "GET" | "HEAD" | "OPTIONS" | "TRACE" | "PUT" | "DELETE"
    )
}

/// The fixed header set attached to every request.
fn build_default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(default_headers::USER_AGENT));
    headers.insert(
        ACCEPT_ENCODING,
        HeaderValue::from_static(default_headers::ACCEPT_ENCODING),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(default_headers::ACCEPT_LANGUAGE),
    );
    headers.insert(CONNECTION, HeaderValue::from_static(default_headers::CONNECTION));
    headers
}

/// Builds the shared reqwest client with pooling, default headers and the
/// effective timeouts from `config`. A timeout is applied only when its
/// configured value is positive; zero or negative leaves reqwest's built-in
/// behavior untouched. Request bodies are streamed by reqwest rather than
/// buffered wholesale, which bounds memory on large uploads.
pub fn build_client(config: &ClientConfig) -> Result<Client, RestClientError> {
    let mut builder = Client::builder()
        .default_headers(build_default_headers())
        .pool_max_idle_per_host(MAX_CONNECTIONS_PER_ROUTE);

    if let Some(connect) = config.connect_timeout() {
        info!("Applying connect timeout: {:?}", connect);
        builder = builder.connect_timeout(connect);
    }
    if let Some(read) = config.read_timeout() {
        info!("Applying read timeout: {:?}", read);
        builder = builder.read_timeout(read);
    }

    Ok(builder.build()?)
}

/// The process-wide shared transport.
///
/// Cheap to clone; clones share the same connection pool and checkout gate.
/// Safe for concurrent use: the gate admits up to
/// [`MAX_TOTAL_CONNECTIONS`] in-flight calls, and callers beyond that block
/// until a slot frees or the pending-connection wait elapses.
#[derive(Debug, Clone)]
pub struct PooledClient {
    client: Client,
    permits: Arc<Semaphore>,
    pending_wait: Option<Duration>,
    retry: RetryPolicy,
}

impl PooledClient {
    /// Builds the transport from `config` with the default retry policy.
    pub fn new(config: &ClientConfig) -> Result<Self, RestClientError> {
        Ok(PooledClient {
            client: build_client(config)?,
            permits: Arc::new(Semaphore::new(MAX_TOTAL_CONNECTIONS)),
            pending_wait: config.connection_request_timeout(),
            retry: RetryPolicy::default(),
        })
    }

    /// Replaces the retry policy. Intended for callers that know every
    /// request they issue is safe to replay.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Executes one call: checks out a slot, sends the request (with bounded
    /// retry of connect-stage failures) and drains the response body.
    #[instrument(skip(self, spec))]
    pub async fn execute(&self, spec: RequestSpec) -> Result<RawResponse, RestClientError> {
        let _permit = self.checkout(&spec.url).await?;

        let mut attempt = 1u32;
        let response = loop {
            match self.build_request(&spec).send().await {
                Ok(resp) => break resp,
                Err(e) => {
                    if self.retry.allows(&spec.method, attempt, e.is_connect()) {
                        warn!(
                            "Connect failure for {} ({}), retrying (attempt {}/{})",
                            spec.url, e, attempt, self.retry.max_attempts
                        );
                        attempt += 1;
                        continue;
                    }
                    return Err(map_send_error(&spec.url, e));
                }
            }
        };

        let status = response.status();
        debug!("Response status: {status} (URL: {})", spec.url);

        // Drain the body while the slot is still held
        let body = response
            .text()
            .await
            .map_err(|e| map_send_error(&spec.url, e))?;
        debug!("Response length: {} bytes", body.len());

        Ok(RawResponse { status, body })
    }

    async fn checkout(
        &self,
        url: &str,
    ) -> Result<tokio::sync::SemaphorePermit<'_>, RestClientError> {
        let acquired = match self.pending_wait {
            Some(wait) => tokio::time::timeout(wait, self.permits.acquire())
                .await
                .map_err(|_| RestClientError::pool_timeout(url, wait.as_millis() as u64))?,
            None => self.permits.acquire().await,
        };
        acquired.map_err(|_| RestClientError::PoolClosed)
    }

    fn build_request(&self, spec: &RequestSpec) -> reqwest::RequestBuilder {
        let request = self
            .client
            .request(spec.method.clone(), &spec.url)
            .headers(spec.headers.clone());
        match &spec.body {
            AdaptedBody::None => request,
            AdaptedBody::Json(text) | AdaptedBody::Raw(text) => request.body(text.clone()),
            AdaptedBody::Form(fields) => request.form(fields),
        }
    }

    /// Closes the transport: in-flight calls finish, subsequent calls fail
    /// fast with [`RestClientError::PoolClosed`]. Idle pooled connections are
    /// released when the last clone drops.
    pub fn close(&self) {
        info!("Closing pooled client");
        self.permits.close();
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }
}

fn map_send_error(url: &str, e: reqwest::Error) -> RestClientError {
    if e.is_timeout() {
        RestClientError::timeout(url)
    } else if e.is_connect() {
        RestClientError::connection(url, e.to_string())
    } else {
        RestClientError::Transport(e)
    }
}
