//! Page fetching for the crawl pipeline
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building an HTTP client with a proper user agent string
//! - GET requests returning status, final URL, and body
//! - Error classification (timeout, connection, transport)
//!
//! The orchestrator consumes fetching through the [`PageFetcher`] trait, so
//! an in-memory stub can stand in for the real client in tests.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// User agent sent when the configuration does not override it
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; Prospect/0.1)";

/// A fetched page, as handed to the phase handlers
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Page body content
    pub html: String,
}

impl FetchedPage {
    /// True when the HTTP status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Errors raised while fetching a single page
///
/// These never abort a crawl phase; the orchestrator logs them and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

/// Capability to fetch one page by URL
///
/// The crawl pipeline is polymorphic over this trait: the shipped
/// implementation is [`HttpFetcher`], and tests substitute in-memory stubs.
/// A non-2xx response is a successful fetch (the handlers apply the status
/// guard); only timeouts and transport problems surface as errors.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// [`PageFetcher`] backed by a shared reqwest client
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
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();

        let html = response.text().await.map_err(|e| FetchError::Transport {
            url: final_url.clone(),
            message: e.to_string(),
        })?;

        Ok(FetchedPage {
            url: final_url,
            status_code,
            html,
        })
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - User-Agent override; falls back to [`DEFAULT_USER_AGENT`]
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use prospect::crawler::build_http_client;
///
/// let client = build_http_client(None).unwrap();
/// ```
pub fn build_http_client(user_agent: Option<&str>) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Classifies a reqwest error into the fetch error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
