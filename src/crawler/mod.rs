//! Crawler module
//!
//! This module contains the crawl machinery:
//! - `driver`: the sequential walk over pages, store, and notifier
//! - `governor`: the fixed-window call-rate limiter for inference requests

mod driver;
mod governor;

pub use driver::{CrawlDriver, CrawlOutcome};
pub use governor::{FixedWindowGovernor, RateLimit};
