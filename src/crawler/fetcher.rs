//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - GET requests to fetch page content, following redirects
//! - Error classification into transient and permanent failures

use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Maximum redirect hops followed for one request
pub const MAX_REDIRECTS: usize = 10;

/// A successfully fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Page body content
    pub body: String,
}

/// Category of a fetch failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Request timed out
    Timeout,
    /// Host name could not be resolved
    Dns,
    /// Connection refused, reset, or TLS failure
    Connection,
    /// HTTP 5xx
    ServerError,
    /// HTTP 4xx
    ClientError,
    /// Response was not `text/html`
    NotHtml,
    /// URL could not be requested at all
    InvalidUrl,
    /// Body was truncated or unreadable
    Body,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FetchErrorKind::Timeout => "timeout",
            FetchErrorKind::Dns => "DNS failure",
            FetchErrorKind::Connection => "connection failure",
            FetchErrorKind::ServerError => "server error",
            FetchErrorKind::ClientError => "client error",
            FetchErrorKind::NotHtml => "not HTML",
            FetchErrorKind::InvalidUrl => "invalid URL",
            FetchErrorKind::Body => "body read failure",
        };
        f.write_str(label)
    }
}

/// A single fetch attempt failed
#[derive(Debug, Clone, Error)]
#[error("{kind} fetching {url}{}: {detail}", status_suffix(.status))]
pub struct FetchError {
    pub url: String,
    pub kind: FetchErrorKind,
    /// Last HTTP status seen, if a response arrived
    pub status: Option<u16>,
    pub detail: String,
}

impl FetchError {
    pub fn new(url: impl Into<String>, kind: FetchErrorKind, detail: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind,
            status: None,
            detail: detail.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether waiting and retrying the same URL might succeed
    ///
    /// | Kind | Retried |
    /// |------|---------|
    /// | Timeout, Connection, ServerError, Body | yes |
    /// | Dns, ClientError, NotHtml, InvalidUrl | no |
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            FetchErrorKind::Timeout
                | FetchErrorKind::Connection
                | FetchErrorKind::ServerError
                | FetchErrorKind::Body
        )
    }

    /// Whether the `www.`-toggled host is worth one attempt
    pub fn suggests_host_variant(&self) -> bool {
        matches!(self.kind, FetchErrorKind::Timeout | FetchErrorKind::Dns)
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

/// Anything that can fetch one URL once
///
/// Retrying is layered on top by [`crate::crawler::RetryPolicy`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - Value of the User-Agent header
/// * `timeout` - Whole-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use linkscout::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client("linkscout/0.1", Duration::from_secs(20)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches a URL once
    ///
    /// # Classification
    ///
    /// | Condition | Kind |
    /// |-----------|------|
    /// | Request timeout | Timeout |
    /// | Name resolution failed | Dns |
    /// | Connection refused/reset, TLS | Connection |
    /// | HTTP 5xx | ServerError |
    /// | HTTP 4xx | ClientError |
    /// | Content-Type not text/html | NotHtml |
    /// | Body read failed | Body |
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_request_error(url, &e))?;

        let status = response.status();
        let final_url = response.url().to_string();

        if status.is_server_error() {
            return Err(
                FetchError::new(url, FetchErrorKind::ServerError, status.to_string())
                    .with_status(status.as_u16()),
            );
        }

        if !status.is_success() {
            return Err(
                FetchError::new(url, FetchErrorKind::ClientError, status.to_string())
                    .with_status(status.as_u16()),
            );
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.to_ascii_lowercase().contains("text/html") {
            return Err(FetchError::new(
                url,
                FetchErrorKind::NotHtml,
                format!("content type '{}'", content_type),
            )
            .with_status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| {
            FetchError::new(url, FetchErrorKind::Body, e.to_string()).with_status(status.as_u16())
        })?;

        Ok(FetchResponse {
            final_url,
            status_code: status.as_u16(),
            body,
        })
    }
}

/// Maps a `reqwest` send error onto a [`FetchErrorKind`]
fn classify_request_error(url: &str, error: &reqwest::Error) -> FetchError {
    let kind = if error.is_timeout() {
        FetchErrorKind::Timeout
    } else if error.is_builder() {
        FetchErrorKind::InvalidUrl
    } else if error.is_connect() {
        if looks_like_dns_failure(error) {
            FetchErrorKind::Dns
        } else {
            FetchErrorKind::Connection
        }
    } else if error.is_redirect() {
        FetchErrorKind::ClientError
    } else if error.is_body() || error.is_decode() {
        FetchErrorKind::Body
    } else {
        FetchErrorKind::Connection
    };

    let fetch_error = FetchError::new(url, kind, error.to_string());
    match error.status() {
        Some(status) => fetch_error.with_status(status.as_u16()),
        None => fetch_error,
    }
}

/// reqwest does not expose resolver failures directly; look through the source chain
fn looks_like_dns_failure(error: &reqwest::Error) -> bool {
    let mut source: Option<&dyn StdError> = error.source();
    while let Some(err) = source {
        let message = err.to_string().to_ascii_lowercase();
        if message.contains("dns")
            || message.contains("lookup")
            || message.contains("resolve")
            || message.contains("name or service not known")
        {
            return true;
        }
        source = err.source();
    }
    false
}
