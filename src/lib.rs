//! Alertmap: an incremental alerts-blog crawler
//!
//! This crate walks a linear chain of alert posts via their next/previous
//! navigation links, derives a location and topic categories for each new post
//! through an external inference API, geocodes the location, and persists a
//! light (index) and heavy (content) view of every post exactly once.

pub mod config;
pub mod crawler;
pub mod enrich;
pub mod model;
pub mod notify;
pub mod page;
pub mod storage;

use thiserror::Error;

/// Main error type for crawl runs
#[derive(Debug, Error)]
pub enum AlertmapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Page extraction failed at {handle}: {source}")]
    PageExtraction {
        handle: String,
        source: page::PageError,
    },

    #[error("Post {id} could not be processed: {source}")]
    PostProcessing { id: String, source: PostError },

    #[error("Storage error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure cause for a single post after extraction succeeded
#[derive(Debug, Error)]
pub enum PostError {
    #[error("enrichment failed: {0}")]
    Enrichment(#[from] enrich::EnrichError),

    #[error("persistence failed: {0}")]
    Persistence(#[from] storage::StoreError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, AlertmapError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlDriver, CrawlOutcome, FixedWindowGovernor, RateLimit};
pub use model::{
    Coordinates, EnrichedRecord, HeavyRecord, LightRecord, PageHandle, RawRecord, RecordDates,
};
pub use page::{CrawlDirection, PageSource};
pub use storage::RecordStore;
