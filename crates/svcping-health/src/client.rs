//! Shared retrying HTTP client used by every checker.
//!
//! A single [`ProbeClient`] is built at startup and cloned into each
//! scheduler. It holds no per-loop state: the wrapped `reqwest::Client`
//! is internally reference counted and safe to use from many tasks.
//!
//! Transient failures (connect errors, timeouts, 429 and most 5xx
//! responses) are retried with exponential backoff inside [`ProbeClient::send`].
//! Callers only ever see the final attempt.

use std::net::SocketAddr;
use std::time::Duration;

use reqwest::header::{HOST, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use thiserror::Error;
use tracing::debug;

use crate::shutdown::Shutdown;

/// Per-request timeout, covering connect through response headers.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

const USER_AGENT: &str = concat!("svcping/", env!("CARGO_PKG_VERSION"));

/// Errors building a [`ProbeRequest`] from config values.
#[derive(Debug, Error)]
pub enum RequestBuildError {
    #[error("invalid url {url:?}: {reason}")]
    Url { url: String, reason: String },

    #[error("invalid header name {name:?}")]
    HeaderName { name: String },

    #[error("invalid value for header {name:?}")]
    HeaderValue { name: String },
}

/// Errors from sending a request through the client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("request cancelled by shutdown")]
    Cancelled,
}

/// An outbound request, before it is handed to the transport.
///
/// The authority override lives in its own field. It is never stored in
/// the header map, so callers can tell "send to this host" apart from
/// the literal headers attached to the request.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    method: Method,
    url: Url,
    host: Option<HeaderValue>,
    headers: HeaderMap,
}

impl ProbeRequest {
    pub fn new(method: Method, url: &str) -> Result<Self, RequestBuildError> {
        let url = Url::parse(url).map_err(|e| RequestBuildError::Url {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            method,
            url,
            host: None,
            headers: HeaderMap::new(),
        })
    }

    pub fn get(url: &str) -> Result<Self, RequestBuildError> {
        Self::new(Method::GET, url)
    }

    pub fn head(url: &str) -> Result<Self, RequestBuildError> {
        Self::new(Method::HEAD, url)
    }

    /// Set a header, replacing any previous value.
    ///
    /// `Host` in any case sets the authority override instead.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), RequestBuildError> {
        let header_value =
            HeaderValue::from_str(value).map_err(|_| RequestBuildError::HeaderValue {
                name: name.to_string(),
            })?;

        if name.eq_ignore_ascii_case(HOST.as_str()) {
            self.host = Some(header_value);
            return Ok(());
        }

        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| RequestBuildError::HeaderName {
                name: name.to_string(),
            })?;
        self.headers.insert(header_name, header_value);
        Ok(())
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Authority override, if one was set.
    pub fn host(&self) -> Option<&str> {
        self.host.as_ref().and_then(|h| h.to_str().ok())
    }

    /// Headers sent as-is. Never contains `Host`.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Bounded exponential backoff between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 disables retrying.
    pub max_retries: u32,
    /// Wait before the first retry. Doubles on each subsequent retry.
    pub min_wait: Duration,
    /// Upper bound for any single wait.
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            min_wait: Duration::from_secs(1),
            max_wait: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `retry` (0-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
        self.min_wait
            .checked_mul(factor)
            .unwrap_or(self.max_wait)
            .min(self.max_wait)
    }
}

/// Whether a response status is worth another attempt.
///
/// 501 is excluded: the server is telling us the method will never work.
fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || (status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED)
}

/// Whether a transport error is worth another attempt.
///
/// Only connection failures and timeouts; anything else fails the same way
/// on every attempt.
fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

/// Builder for [`ProbeClient`].
#[derive(Debug, Clone)]
pub struct ProbeClientBuilder {
    timeout: Duration,
    retry: RetryPolicy,
    resolve: Vec<(String, SocketAddr)>,
    no_proxy: bool,
}

impl Default for ProbeClientBuilder {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            resolve: Vec::new(),
            no_proxy: false,
        }
    }
}

impl ProbeClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Pin `domain` to `addr` instead of using DNS. The port in the URL
    /// still decides where the connection goes.
    pub fn resolve(mut self, domain: impl Into<String>, addr: SocketAddr) -> Self {
        self.resolve.push((domain.into(), addr));
        self
    }

    /// Ignore `HTTP_PROXY`-style environment variables.
    pub fn no_proxy(mut self) -> Self {
        self.no_proxy = true;
        self
    }

    pub fn build(self) -> Result<ProbeClient, ClientError> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);
        for (domain, addr) in &self.resolve {
            builder = builder.resolve(domain, *addr);
        }
        if self.no_proxy {
            builder = builder.no_proxy();
        }

        Ok(ProbeClient {
            inner: builder.build()?,
            retry: self.retry,
        })
    }
}

/// Retrying HTTP client shared read-only by all checkers.
#[derive(Debug, Clone)]
pub struct ProbeClient {
    inner: reqwest::Client,
    retry: RetryPolicy,
}

impl ProbeClient {
    pub fn builder() -> ProbeClientBuilder {
        ProbeClientBuilder::default()
    }

    /// Client with the default timeout and retry policy.
    pub fn new() -> Result<Self, ClientError> {
        Self::builder().build()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Send a request and return the status of the final attempt.
    ///
    /// Both the attempts and the waits between them end early with
    /// [`ClientError::Cancelled`] once `shutdown` fires.
    pub async fn send(
        &self,
        request: &ProbeRequest,
        shutdown: &Shutdown,
    ) -> Result<StatusCode, ClientError> {
        let mut retry = 0;
        loop {
            let result = tokio::select! {
                biased;
                _ = shutdown.triggered() => return Err(ClientError::Cancelled),
                result = self.execute(request) => result,
            };

            let retryable = match &result {
                Ok(status) => is_retryable_status(*status),
                Err(e) => is_transient(e),
            };
            if !retryable || retry >= self.retry.max_retries {
                return result.map_err(ClientError::from);
            }

            let wait = self.retry.backoff(retry);
            match &result {
                Ok(status) => debug!(url = %request.url, %status, ?wait, retry, "retrying request"),
                Err(e) => debug!(url = %request.url, error = %e, ?wait, retry, "retrying request"),
            }

            tokio::select! {
                biased;
                _ = shutdown.triggered() => return Err(ClientError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }
            retry += 1;
        }
    }

    async fn execute(&self, request: &ProbeRequest) -> Result<StatusCode, reqwest::Error> {
        let mut builder = self
            .inner
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        // The transport takes the authority override as an explicit Host
        // header, which it sends in place of the one derived from the URL.
        if let Some(host) = &request.host {
            builder = builder.header(HOST, host.clone());
        }

        let response = builder.send().await?;
        Ok(response.status())
    }
}
