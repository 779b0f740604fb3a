//! Page source module for fetching and extracting posts
//!
//! This module handles turning a blog page into a raw record:
//! - The `PageSource` capability interface the driver consumes
//! - Field extraction from WordPress-style post markup
//! - Navigation link resolution for both traversal directions
//! - HTTP fetching with the shared client

mod extract;
mod http_source;

pub use extract::{article_text, extract_post, rewrite_content_links};
pub use http_source::{build_http_client, HttpPageSource};

use crate::model::{PageHandle, RawRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Traversal direction along the post chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlDirection {
    /// Follow the "newer post" navigation link (incremental catch-up)
    Newer,

    /// Follow the "older post" navigation link (historical backfill)
    Older,
}

/// A fetched page: the extracted record plus the next position, if any
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub record: RawRecord,

    /// Handle of the page the navigation link points at; `None` ends the crawl
    pub next: Option<PageHandle>,
}

/// Errors raised while fetching or extracting a page
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Required field missing from page: {0}")]
    MissingField(&'static str),

    #[error("Malformed {field} timestamp: '{value}'")]
    MalformedTime { field: &'static str, value: String },

    #[error("Invalid navigation link '{href}': {source}")]
    InvalidLink {
        href: String,
        source: url::ParseError,
    },
}

/// Result type for page operations
pub type PageResult<T> = Result<T, PageError>;

/// Capability interface over the page-rendering/extraction mechanism
///
/// Implementations return the current page's record together with the handle
/// the navigation link points at. The driver never inspects handles; it only
/// passes them back in, so a source may encode position however it likes.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn load(&self, handle: &PageHandle) -> PageResult<LoadedPage>;
}
