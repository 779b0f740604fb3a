//! Location phrase geocoding
//!
//! Resolves a location phrase to coordinates through a Nominatim-compatible
//! search endpoint. Only the best match is requested; no match at all is a
//! normal outcome, not an error.

use crate::config::GeocoderConfig;
use crate::enrich::{EnrichError, EnrichResult};
use crate::model::Coordinates;
use async_trait::async_trait;
use serde::Deserialize;

/// Longest phrase worth sending to the geocoder; anything longer is prose
/// the inference step failed to trim down
const MAX_QUERY_LEN: usize = 200;

/// Capability interface over coordinate resolution
///
/// `Ok(None)` means the service answered but found nothing; transport and
/// API failures are errors.
#[async_trait]
pub trait GeoResolver: Send + Sync {
    async fn resolve(&self, phrase: &str) -> EnrichResult<Option<Coordinates>>;
}

/// Nominatim-compatible geocoding adapter
pub struct NominatimResolver {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimResolver {
    pub fn new(client: reqwest::Client, config: &GeocoderConfig) -> Self {
        Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

#[async_trait]
impl GeoResolver for NominatimResolver {
    async fn resolve(&self, phrase: &str) -> EnrichResult<Option<Coordinates>> {
        if phrase.len() > MAX_QUERY_LEN {
            tracing::warn!(
                "Refusing to geocode a {}-character phrase, treating as unresolved",
                phrase.len()
            );
            return Ok(None);
        }

        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", phrase), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnrichError::Geocoder {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let results: Vec<NominatimResult> = serde_json::from_str(&body)
            .map_err(|e| EnrichError::MalformedResponse(e.to_string()))?;

        let first = match results.into_iter().next() {
            Some(first) => first,
            None => return Ok(None),
        };

        let latitude = parse_coordinate("lat", &first.lat)?;
        let longitude = parse_coordinate("lon", &first.lon)?;

        tracing::debug!(
            "Geocoded '{}' to {} ({}, {})",
            phrase,
            first.display_name,
            latitude,
            longitude
        );

        Ok(Some(Coordinates {
            latitude,
            longitude,
        }))
    }
}

fn parse_coordinate(field: &str, value: &str) -> EnrichResult<f64> {
    value.parse::<f64>().map_err(|_| {
        EnrichError::MalformedResponse(format!("unparseable {} value: '{}'", field, value))
    })
}
