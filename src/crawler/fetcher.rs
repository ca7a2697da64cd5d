//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building HTTP clients with proper user agent strings
//! - Per-host pacing between consecutive requests
//! - Retry with exponential backoff for transient failures
//! - Error classification into page states

use crate::config::{FetcherConfig, UserAgentConfig};
use crate::state::{HostState, PageState};
use crate::url::extract_host;
use reqwest::{header, redirect::Policy, Client, StatusCode};
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// Why a page could not be fetched
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("expected HTML, got content type {0:?}")]
    NotHtml(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<FetchError> },
}

impl FetchError {
    /// Whether the same request may succeed if repeated
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Connect(_) => true,
            Self::Status(code) => *code == 429 || (500..600).contains(code),
            _ => false,
        }
    }

    /// Terminal page state for a page that failed with this error
    pub fn page_state(&self) -> PageState {
        match self {
            Self::Status(404) | Self::Status(410) => PageState::DeadLink,
            Self::Status(code) if (400..500).contains(code) && *code != 429 => PageState::DeadLink,
            Self::Status(_) | Self::Timeout | Self::Connect(_) => PageState::Unreachable,
            Self::InvalidUrl(_) => PageState::InvalidUrl,
            Self::NotHtml(_) => PageState::ContentMismatch,
            Self::Body(_) | Self::Request(_) => PageState::Failed,
            Self::RetriesExhausted { last, .. } => last.page_state(),
        }
    }

    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else if let Some(status) = error.status() {
            Self::Status(status.as_u16())
        } else if error.is_builder() {
            Self::InvalidUrl(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }
}

/// Anything that can turn a URL into page markup
///
/// The pipeline is generic over this so it can run against fixtures.
pub trait PageSource {
    fn fetch(&mut self, url: &Url) -> impl Future<Output = Result<String, FetchError>>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout_secs` - Whole-request timeout
///
/// # Example
///
/// ```no_run
/// use oscar_ledger::config::UserAgentConfig;
/// use oscar_ledger::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "OscarLedger".to_string(),
///     crawler_version: "0.1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, 30).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig, timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Format: Name/Version (+ContactURL; ContactEmail)
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Paced, retrying HTTP page source
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
    hosts: HashMap<String, HostState>,
}

impl Fetcher {
    pub fn new(client: Client, config: FetcherConfig) -> Self {
        Self {
            client,
            config,
            hosts: HashMap::new(),
        }
    }

    /// Builds the client and fetcher from configuration
    pub fn from_config(
        fetcher: &FetcherConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, fetcher.timeout_secs)?;
        Ok(Self::new(client, fetcher.clone()))
    }

    /// Pacing state of a host, if it has been contacted
    pub fn host_state(&self, host: &str) -> Option<&HostState> {
        self.hosts.get(host)
    }

    /// Delay before retry number `attempt + 1`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = self.config.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis((self.config.backoff_ms as f64 * factor) as u64)
    }

    async fn wait_for_host(&mut self, host: &str) {
        let min_delay = Duration::from_millis(self.config.delay_ms);
        let state = self.hosts.entry(host.to_string()).or_default();

        if let Some(wait) = state.time_until_next_request(min_delay, Instant::now()) {
            tracing::debug!("Waiting {:?} before next request to {}", wait, host);
            tokio::time::sleep(wait).await;
        }
        state.record_request(Instant::now());
    }

    async fn fetch_once(&mut self, url: &Url, host: &str) -> Result<String, FetchError> {
        self.wait_for_host(host).await;

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            if let Some(state) = self.hosts.get_mut(host) {
                state.record_throttled();
            }
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !content_type.is_empty()
            && !content_type.contains("text/html")
            && !content_type.contains("application/xhtml")
        {
            return Err(FetchError::NotHtml(content_type));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

impl PageSource for Fetcher {
    /// Fetches a page, retrying transient failures with backoff
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx, HTML | Body returned |
    /// | HTTP 5xx, 429, timeout, connect error | Retried up to `max-retries` |
    /// | HTTP 404 and other 4xx | Immediate failure |
    /// | Non-HTML content | Immediate failure |
    async fn fetch(&mut self, url: &Url) -> Result<String, FetchError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }
        let host = extract_host(url).ok_or_else(|| FetchError::InvalidUrl(url.to_string()))?;

        let mut attempt = 0;
        loop {
            match self.fetch_once(url, &host).await {
                Ok(body) => return Ok(body),
                Err(error) if error.is_transient() => {
                    if attempt >= self.config.max_retries {
                        return Err(FetchError::RetriesExhausted {
                            attempts: attempt + 1,
                            last: Box::new(error),
                        });
                    }
                    let delay = self.backoff_delay(attempt);
                    tracing::warn!(
                        "Transient failure for {} ({}), retrying in {:?}",
                        url,
                        error,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
