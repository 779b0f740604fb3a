//! Enrichment pipeline
//!
//! Derives structured fields from a raw post before it is stored:
//! - A location phrase and topic categories, inferred from the article text
//! - Coordinates for the phrase, resolved through the geocoder
//!
//! Inference answers are free text and arrive untrusted: the parsing here
//! maps the "N/A" sentinel and anything malformed to absent fields rather
//! than failing the post.

mod client;
mod geocode;
mod prompts;

pub use client::{EnrichmentClient, GeminiClient, PromptKind};
pub use geocode::{GeoResolver, NominatimResolver};
pub use prompts::build_prompt;

use crate::crawler::RateLimit;
use crate::model::{EnrichedRecord, RawRecord};
use crate::page::article_text;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by the inference and geocoding adapters
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Inference API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Geocoder error ({status}): {body}")]
    Geocoder { status: u16, body: String },

    #[error("Malformed API response: {0}")]
    MalformedResponse(String),
}

/// Result type for enrichment operations
pub type EnrichResult<T> = Result<T, EnrichError>;

/// Capability interface over record enrichment
#[async_trait]
pub trait Enrich: Send + Sync {
    async fn enrich(&self, record: &RawRecord) -> EnrichResult<EnrichedRecord>;
}

/// Longest category label the inference step may produce; anything longer
/// means the model answered in prose
const MAX_CATEGORY_LEN: usize = 64;

/// Most categories kept per post
const MAX_CATEGORIES: usize = 3;

/// Runs the two inference prompts and the geocoder for each new post
///
/// Both inference calls pass through the governor; the geocoder has its own
/// usage policy and is not governed.
pub struct Enricher {
    client: Box<dyn EnrichmentClient>,
    geocoder: Box<dyn GeoResolver>,
    governor: Arc<dyn RateLimit>,
    place_context: String,
}

impl Enricher {
    pub fn new(
        client: Box<dyn EnrichmentClient>,
        geocoder: Box<dyn GeoResolver>,
        governor: Arc<dyn RateLimit>,
        place_context: String,
    ) -> Self {
        Self {
            client,
            geocoder,
            governor,
            place_context,
        }
    }
}

#[async_trait]
impl Enrich for Enricher {
    async fn enrich(&self, record: &RawRecord) -> EnrichResult<EnrichedRecord> {
        let text = article_text(record);

        self.governor.acquire().await;
        let location_answer = self.client.infer(PromptKind::Location, &text).await?;
        let phrase = parse_location_answer(&location_answer);

        self.governor.acquire().await;
        let categories_answer = self.client.infer(PromptKind::Categories, &text).await?;
        let categories = parse_categories_answer(&categories_answer);

        let location = match phrase {
            Some(place) => {
                // Suffix the shared place context so the geocoder searches
                // the right part of the world
                let query = format!("{}, {}", place, self.place_context);
                let resolved = self.geocoder.resolve(&query).await?;
                if resolved.is_none() {
                    tracing::debug!(
                        "Location phrase '{}' did not geocode for post {}",
                        place,
                        record.id
                    );
                }
                resolved
            }
            None => None,
        };

        Ok(EnrichedRecord {
            raw: record.clone(),
            categories,
            location,
        })
    }
}

/// Maps a location inference answer to a phrase
///
/// The "N/A" sentinel (any casing) and empty answers mean the post has no
/// specific location. Surrounding whitespace and quotes are stripped.
fn parse_location_answer(answer: &str) -> Option<String> {
    let cleaned = answer
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim();

    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("n/a") {
        return None;
    }

    Some(cleaned.to_string())
}

/// Parses a comma-separated category answer into at most three labels
///
/// Empty answers, and answers where any entry is too long to be a label,
/// map to absent categories.
fn parse_categories_answer(answer: &str) -> Option<Vec<String>> {
    let entries: Vec<String> = answer
        .split(',')
        .map(|entry| entry.trim().trim_matches('"').trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect();

    if entries.is_empty() || entries.iter().any(|entry| entry.len() > MAX_CATEGORY_LEN) {
        return None;
    }

    Some(entries.into_iter().take(MAX_CATEGORIES).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_location_answer_plain_phrase() {
        assert_eq!(
            parse_location_answer("Schmitz Hall"),
            Some("Schmitz Hall".to_string())
        );
    }

    #[test]
    fn test_location_answer_strips_quotes_and_whitespace() {
        assert_eq!(
            parse_location_answer(" \"Drumheller Fountain\" \n"),
            Some("Drumheller Fountain".to_string())
        );
    }

    #[test]
    fn test_location_answer_sentinel_any_casing() {
        assert_eq!(parse_location_answer("N/A"), None);
        assert_eq!(parse_location_answer("n/a"), None);
        assert_eq!(parse_location_answer("\"N/A\""), None);
    }

    #[test]
    fn test_location_answer_empty_is_absent() {
        assert_eq!(parse_location_answer(""), None);
        assert_eq!(parse_location_answer("  \n "), None);
    }

    #[test]
    fn test_categories_answer_splits_and_trims() {
        assert_eq!(
            parse_categories_answer("infrastructure, facility"),
            Some(vec!["infrastructure".to_string(), "facility".to_string()])
        );
    }

    #[test]
    fn test_categories_answer_single_label() {
        assert_eq!(
            parse_categories_answer("crime\n"),
            Some(vec!["crime".to_string()])
        );
    }

    #[test]
    fn test_categories_answer_caps_at_three() {
        let parsed = parse_categories_answer("a, b, c, d").unwrap();
        assert_eq!(parsed, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_categories_answer_drops_empty_entries() {
        assert_eq!(
            parse_categories_answer("crime, , weather"),
            Some(vec!["crime".to_string(), "weather".to_string()])
        );
    }

    #[test]
    fn test_categories_answer_empty_is_absent() {
        assert_eq!(parse_categories_answer(""), None);
        assert_eq!(parse_categories_answer(", ,"), None);
    }

    #[test]
    fn test_categories_answer_prose_is_absent() {
        let prose = "Based on my reading of the post I would say this is best described as \
                     an infrastructure issue affecting the campus water system";
        assert_eq!(parse_categories_answer(prose), None);
    }

    struct StubClient {
        location: String,
        categories: String,
    }

    #[async_trait]
    impl EnrichmentClient for StubClient {
        async fn infer(&self, kind: PromptKind, _article_text: &str) -> EnrichResult<String> {
            match kind {
                PromptKind::Location => Ok(self.location.clone()),
                PromptKind::Categories => Ok(self.categories.clone()),
            }
        }
    }

    struct RecordingGeocoder {
        queries: Arc<Mutex<Vec<String>>>,
        result: Option<Coordinates>,
    }

    impl RecordingGeocoder {
        fn new(result: Option<Coordinates>) -> Self {
            Self {
                queries: Arc::new(Mutex::new(Vec::new())),
                result,
            }
        }
    }

    #[async_trait]
    impl GeoResolver for RecordingGeocoder {
        async fn resolve(&self, phrase: &str) -> EnrichResult<Option<Coordinates>> {
            self.queries.lock().unwrap().push(phrase.to_string());
            Ok(self.result)
        }
    }

    struct CountingGovernor {
        acquires: AtomicU32,
    }

    #[async_trait]
    impl RateLimit for CountingGovernor {
        async fn acquire(&self) {
            self.acquires.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn sample_record() -> RawRecord {
        RawRecord {
            id: "post-42".to_string(),
            url: "https://alerts.example.edu/?p=42".to_string(),
            title: "Water main break".to_string(),
            header_markup: String::new(),
            content_markup: "<p>Crews are at Schmitz Hall.</p>".to_string(),
            upload_time: Utc.with_ymd_and_hms(2025, 1, 15, 16, 30, 0).unwrap(),
            update_time: None,
        }
    }

    fn enricher_with(
        client: StubClient,
        geocoder: RecordingGeocoder,
        governor: Arc<CountingGovernor>,
    ) -> Enricher {
        Enricher::new(
            Box::new(client),
            Box::new(geocoder),
            governor,
            "University District, Seattle".to_string(),
        )
    }

    #[tokio::test]
    async fn test_enrich_resolves_location_and_categories() {
        let client = StubClient {
            location: "Schmitz Hall".to_string(),
            categories: "infrastructure, facility".to_string(),
        };
        let geocoder = RecordingGeocoder::new(Some(Coordinates {
            latitude: 47.656,
            longitude: -122.308,
        }));
        let queries = geocoder.queries.clone();
        let governor = Arc::new(CountingGovernor {
            acquires: AtomicU32::new(0),
        });

        let enricher = enricher_with(client, geocoder, governor.clone());
        let enriched = enricher.enrich(&sample_record()).await.unwrap();

        assert_eq!(
            enriched.categories,
            Some(vec!["infrastructure".to_string(), "facility".to_string()])
        );
        let location = enriched.location.unwrap();
        assert_eq!(location.latitude, 47.656);
        assert_eq!(location.longitude, -122.308);

        // Both inference calls passed through the governor
        assert_eq!(governor.acquires.load(Ordering::SeqCst), 2);

        // The geocoder query carries the place context
        assert_eq!(
            queries.lock().unwrap().as_slice(),
            ["Schmitz Hall, University District, Seattle"]
        );
    }

    #[tokio::test]
    async fn test_sentinel_location_skips_geocoder() {
        let client = StubClient {
            location: "N/A".to_string(),
            categories: "general".to_string(),
        };
        let geocoder = RecordingGeocoder::new(Some(Coordinates {
            latitude: 47.656,
            longitude: -122.308,
        }));
        let queries = geocoder.queries.clone();
        let governor = Arc::new(CountingGovernor {
            acquires: AtomicU32::new(0),
        });

        let enricher = enricher_with(client, geocoder, governor.clone());
        let enriched = enricher.enrich(&sample_record()).await.unwrap();

        assert!(enriched.location.is_none());
        assert!(queries.lock().unwrap().is_empty());
        assert_eq!(governor.acquires.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unresolved_phrase_leaves_location_absent() {
        let client = StubClient {
            location: "the west stairwell".to_string(),
            categories: "facility".to_string(),
        };
        let geocoder = RecordingGeocoder::new(None);
        let governor = Arc::new(CountingGovernor {
            acquires: AtomicU32::new(0),
        });

        let enricher = enricher_with(client, geocoder, governor);
        let enriched = enricher.enrich(&sample_record()).await.unwrap();

        assert!(enriched.location.is_none());
        assert_eq!(enriched.categories, Some(vec!["facility".to_string()]));
    }
}
