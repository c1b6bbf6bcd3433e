//! Page retrieval
//!
//! Every network read in the crawler goes through the [`PageSource`] seam.
//! [`HttpSource`] is the production implementation; tests substitute an
//! in-memory source. A retrieval never fails with an error: it resolves to a
//! [`FetchResult`] variant that names what happened. Any response whose body
//! can be read is a success, whatever its status: error pages are parsed like
//! any other page and simply yield fallback records or no links.

use crate::config::{CrawlerConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Result of a single page retrieval
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// The server answered and the body was read
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Connection, timeout, or body read failure
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Body of the page, or why there is none
    ///
    /// Error statuses and redirects are logged; their bodies are still returned.
    pub fn into_page(self, requested: &Url) -> Result<String, String> {
        match self {
            FetchResult::Success {
                final_url,
                status_code,
                body,
            } => {
                if !(200..300).contains(&status_code) {
                    tracing::debug!("{} answered HTTP {}, parsing anyway", requested, status_code);
                }
                if final_url != requested.as_str() {
                    tracing::debug!("{} redirected to {}", requested, final_url);
                }
                Ok(body)
            }
            FetchResult::NetworkError { error } => Err(error),
        }
    }
}

/// Anything that can retrieve a page by URL
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Retrieves one page, once, within the source's timeout
    async fn fetch(&self, url: &Url) -> FetchResult;
}

/// Builds an HTTP client with the crawler's user agent and timeouts
///
/// # Example
///
/// ```no_run
/// use bisnis_crawler::config::Config;
/// use bisnis_crawler::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.crawler, &config.user_agent).unwrap();
/// ```
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(crawler.request_timeout);

    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageSource`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from configuration
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(crawler, user_agent)?))
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn fetch(&self, url: &Url) -> FetchResult {
        fetch_url(&self.client, url.as_str()).await
    }
}

/// Fetches a URL with a single attempt
///
/// | Condition | Result |
/// |-----------|--------|
/// | Any status with readable body | `Success` |
/// | Timeout | `NetworkError("Request timeout")` |
/// | Connection refused / DNS / TLS | `NetworkError("Connection failed")` |
/// | Body read failure | `NetworkError` |
///
/// There is no retry: an unreachable page is simply absent from the run.
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection failed".to_string()
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    let final_url = response.url().to_string();
    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}
