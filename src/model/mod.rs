//! Record types shared across the crawl pipeline
//!
//! This module defines:
//! - The navigation handle used to address a post page
//! - The raw record extracted from a page
//! - The enriched record (raw + derived location/categories)
//! - The persisted light (index) and heavy (content) views
//!
//! Light and heavy records are the stable wire contract consumed by the map
//! front-end: field names are camelCase, timestamps nest under `date`, and an
//! unresolved location is an absent key, never `null`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Opaque reference to the current position in the crawl
///
/// Produced by the page source after each navigation and consumed once by the
/// driver to fetch the next page; never reused after advancing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHandle(Url);

impl PageHandle {
    /// Parses a handle from a URL string
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Url::parse(input).map(PageHandle)
    }

    /// The URL this handle addresses
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl From<Url> for PageHandle {
    fn from(url: Url) -> Self {
        PageHandle(url)
    }
}

impl std::fmt::Display for PageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geographic coordinates resolved from a location phrase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A post as extracted from its page, before enrichment
///
/// Immutable after extraction; `id` is the natural key for deduplication.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Stable unique identifier (the post container's element id)
    pub id: String,

    /// Canonical URL of the post
    pub url: String,

    /// Post title
    pub title: String,

    /// Inner HTML of the post header
    pub header_markup: String,

    /// Inner HTML of the post body, with embedded links rewritten
    pub content_markup: String,

    /// Original publication time
    pub upload_time: DateTime<Utc>,

    /// Last-modified time, when the page exposes one
    pub update_time: Option<DateTime<Utc>>,
}

/// A raw record plus derived metadata
///
/// Absent categories or location mean enrichment yielded nothing usable for
/// that field, which is a valid outcome rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub raw: RawRecord,

    /// 1 to 3 category labels, in the order the inference answer listed them
    pub categories: Option<Vec<String>>,

    pub location: Option<Coordinates>,
}

/// Publication timestamps as persisted on both record views
///
/// `updateTime` is always serialized, as `null` when the post was never
/// updated; front-end code relies on the key being present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDates {
    pub upload_time: DateTime<Utc>,
    pub update_time: Option<DateTime<Utc>>,
}

/// Index view of a post, used for listing and map placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightRecord {
    pub id: String,
    pub url: String,
    pub title: String,
    pub date: RecordDates,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
}

/// Content view of a post, used for detail display
///
/// Paired 1:1 with a [`LightRecord`] by identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeavyRecord {
    pub id: String,
    pub url: String,
    pub title: String,
    pub date: RecordDates,
    pub content_markup: String,
}

impl EnrichedRecord {
    /// Splits the record into its persisted light and heavy views
    ///
    /// Both views share the raw record's identifier; the light view never
    /// carries content markup and the heavy view never carries derived
    /// metadata.
    pub fn split(&self) -> (LightRecord, HeavyRecord) {
        let date = RecordDates {
            upload_time: self.raw.upload_time,
            update_time: self.raw.update_time,
        };

        let light = LightRecord {
            id: self.raw.id.clone(),
            url: self.raw.url.clone(),
            title: self.raw.title.clone(),
            date: date.clone(),
            categories: self.categories.clone(),
            location: self.location,
        };

        let heavy = HeavyRecord {
            id: self.raw.id.clone(),
            url: self.raw.url.clone(),
            title: self.raw.title.clone(),
            date,
            content_markup: self.raw.content_markup.clone(),
        };

        (light, heavy)
    }
}
