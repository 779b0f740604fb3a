//! HTTP page source
//!
//! Fetches post pages over HTTP with the shared client and hands the
//! rendered markup to the extractor.

use crate::config::UserAgentConfig;
use crate::model::PageHandle;
use crate::page::{extract_post, CrawlDirection, LoadedPage, PageError, PageResult, PageSource};
use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - User agent configuration
///
/// # Returns
///
/// A configured reqwest Client
///
/// # Example
///
/// ```no_run
/// use alertmap::config::UserAgentConfig;
/// use alertmap::page::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "alertmap".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.edu/alertmap".to_string(),
///     contact_email: "ops@example.edu".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        // Shortlink post URLs redirect to pretty permalinks
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Page source that fetches posts over HTTP and extracts them from the
/// rendered markup
pub struct HttpPageSource {
    client: Client,
    direction: CrawlDirection,
}

impl HttpPageSource {
    pub fn new(client: Client, direction: CrawlDirection) -> Self {
        Self { client, direction }
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn load(&self, handle: &PageHandle) -> PageResult<LoadedPage> {
        tracing::debug!("Fetching page: {}", handle);

        let response = self.client.get(handle.as_url().clone()).send().await?;
        let status = response.status();
        // Relative links resolve against the URL we ended up at, not the
        // one we asked for
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(PageError::Status {
                status: status.as_u16(),
                url: final_url.to_string(),
            });
        }

        let body = response.text().await?;
        extract_post(&body, &final_url, self.direction)
    }
}
