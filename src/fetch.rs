//! Page fetching for the research pipeline
//!
//! This module provides the `PageFetcher` seam and its HTTP implementation:
//! - one GET per URL with a bounded timeout
//! - host validation (blocking private ranges and non-http schemes)
//! - typed per-URL failures that render as short diagnostics
//!
//! A failed fetch is never fatal to the caller; the aggregator turns it
//! into an inline line of text.

use crate::config::FetchConfig;
use crate::error::{DeskchatError, Result};
use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const MAX_REDIRECTS: usize = 10;

/// Reason a single URL could not be fetched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// URL could not be parsed
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// URL points somewhere the fetcher refuses to go
    #[error("blocked: {0}")]
    Blocked(String),

    /// Request did not complete within the timeout
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Connection could not be established
    #[error("connection failed: {0}")]
    Connect(String),

    /// Server answered with a non-success status
    #[error("HTTP {0}")]
    Status(u16),

    /// Body could not be read
    #[error("failed to read response body: {0}")]
    Body(String),

    /// Any other transport failure
    #[error("request error: {0}")]
    Request(String),
}

/// Source of raw page content
///
/// Implementations return the unmodified response body on success.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a single URL
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError>;
}

/// Host validator guarding against server-side request forgery
///
/// Research fetches follow URLs chosen by a third-party search page, so
/// loopback, private, link-local and broadcast targets are refused unless
/// explicitly allowed.
#[derive(Debug, Clone, Default)]
pub struct HostGuard {
    allow_private_hosts: bool,
}

impl HostGuard {
    /// Create a guard that blocks private hosts
    pub fn new() -> Self {
        Self {
            allow_private_hosts: false,
        }
    }

    /// Create a guard that lets private hosts through (local mocks, intranets)
    pub fn allow_private_hosts() -> Self {
        Self {
            allow_private_hosts: true,
        }
    }

    /// Validate a URL before it is requested
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` for unparseable or host-less URLs and
    /// `FetchError::Blocked` for refused schemes and addresses
    pub fn check(&self, url: &str) -> std::result::Result<Url, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(FetchError::Blocked(format!(
                    "{}:// URLs are not allowed",
                    other
                )))
            }
        }

        let host = parsed
            .host()
            .ok_or_else(|| FetchError::InvalidUrl("URL has no host".to_string()))?;

        if self.allow_private_hosts {
            return Ok(parsed);
        }

        let ip = match host {
            url::Host::Domain(domain) => {
                if domain.eq_ignore_ascii_case("localhost") {
                    return Err(FetchError::Blocked(
                        "requests to localhost are not allowed".to_string(),
                    ));
                }
                return Ok(parsed);
            }
            url::Host::Ipv4(v4) => IpAddr::V4(v4),
            url::Host::Ipv6(v6) => IpAddr::V6(v6),
        };

        if is_restricted_ip(ip) {
            return Err(FetchError::Blocked(format!(
                "requests to {} are not allowed",
                ip
            )));
        }

        Ok(parsed)
    }
}

fn is_restricted_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                || v4.octets()[0] == 0
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                // fc00::/7 unique local
                || (first & 0xfe00) == 0xfc00
                // fe80::/10 link local
                || (first & 0xffc0) == 0xfe80
        }
    }
}

fn guarded_redirects(guard: HostGuard) -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error(FetchError::Request("too many redirects".to_string()));
        }
        match guard.check(attempt.url().as_str()) {
            Ok(_) => attempt.follow(),
            Err(e) => attempt.error(e),
        }
    })
}

/// The guard error behind a refused redirect, if any
fn refused_redirect(err: &reqwest::Error) -> Option<FetchError> {
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        if let Some(fetch_err) = inner.downcast_ref::<FetchError>() {
            return Some(fetch_err.clone());
        }
        source = std::error::Error::source(inner);
    }
    None
}

/// HTTP implementation of `PageFetcher`
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    guard: HostGuard,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher with the given per-request timeout
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use deskchat::fetch::HttpFetcher;
    /// use std::time::Duration;
    ///
    /// let fetcher = HttpFetcher::new(Duration::from_secs(10)).unwrap();
    /// assert_eq!(fetcher.timeout(), Duration::from_secs(10));
    /// ```
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_guard(timeout, HostGuard::new())
    }

    /// Create a fetcher with an explicit host guard
    ///
    /// The guard is applied to the requested URL and to every redirect hop.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn with_guard(timeout: Duration, guard: HostGuard) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(crate::search::BROWSER_USER_AGENT)
            .redirect(guarded_redirects(guard.clone()))
            .build()
            .map_err(|e| DeskchatError::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            guard,
            timeout,
        })
    }

    /// Build a fetcher from configuration
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn from_config(config: &FetchConfig) -> Result<Self> {
        let guard = if config.allow_private_hosts {
            HostGuard::allow_private_hosts()
        } else {
            HostGuard::new()
        };
        Self::with_guard(Duration::from_secs(config.timeout_seconds), guard)
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if let Some(refused) = refused_redirect(&err) {
            refused
        } else if err.is_timeout() {
            FetchError::Timeout(self.timeout.as_secs())
        } else if err.is_connect() {
            FetchError::Connect(err.to_string())
        } else {
            FetchError::Request(err.to_string())
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        let target = self.guard.check(url)?;

        tracing::debug!("Fetching {}", target);
        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout.as_secs())
            } else {
                FetchError::Body(e.to_string())
            }
        })
    }
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("timeout", &self.timeout)
            .field("guard", &self.guard)
            .finish()
    }
}
