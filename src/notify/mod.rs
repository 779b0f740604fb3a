//! Best-effort notification side-channel
//!
//! Sends a confirmation for each newly stored post. Notification failures
//! never affect the crawl: the driver logs them and moves on.

use crate::config::NotifyConfig;
use crate::model::EnrichedRecord;
use crate::page::article_text;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while sending a notification
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail API error ({status}): {body}")]
    Api { status: u16, body: String },
}

/// Capability interface for new-post alerting
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, record: &EnrichedRecord) -> Result<(), NotifyError>;
}

/// Notifier used when notifications are disabled
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, record: &EnrichedRecord) -> Result<(), NotifyError> {
        tracing::debug!("Notifications disabled, not announcing post {}", record.raw.id);
        Ok(())
    }
}

/// Length of the article excerpt included in confirmation emails
const EXCERPT_CHARS: usize = 1000;

/// Notifier that emails a confirmation for each newly stored post
pub struct EmailNotifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    from: String,
    to: Vec<String>,
    subject: String,
}

impl EmailNotifier {
    pub fn new(client: reqwest::Client, config: &NotifyConfig, api_key: String) -> Self {
        Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            from: config.from.clone(),
            to: config.to.clone(),
            subject: config.subject.clone(),
        }
    }
}

#[derive(Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: String,
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, record: &EnrichedRecord) -> Result<(), NotifyError> {
        let request = EmailRequest {
            from: &self.from,
            to: &self.to,
            subject: &self.subject,
            html: build_html(record),
        };

        let url = format!("{}/emails", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("Confirmation email sent for post {}", record.raw.id);
        Ok(())
    }
}

/// Renders the confirmation email body
fn build_html(record: &EnrichedRecord) -> String {
    let categories = record
        .categories
        .as_ref()
        .map(|c| c.join(", "))
        .unwrap_or_else(|| "none".to_string());

    let location = record
        .location
        .map(|c| format!("({}, {})", c.latitude, c.longitude))
        .unwrap_or_else(|| "not resolved".to_string());

    let excerpt: String = article_text(&record.raw).chars().take(EXCERPT_CHARS).collect();

    format!(
        "<h2>New post stored: {}</h2>\
         <p><a href=\"{}\">{}</a></p>\
         <p>Categories: {}</p>\
         <p>Location: {}</p>\
         <hr>\
         <p>{}</p>",
        record.raw.title, record.raw.url, record.raw.url, categories, location, excerpt
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinates, RawRecord};
    use chrono::{TimeZone, Utc};

    fn sample_record(content: &str) -> EnrichedRecord {
        EnrichedRecord {
            raw: RawRecord {
                id: "post-42".to_string(),
                url: "https://alerts.example.edu/?p=42".to_string(),
                title: "Water main break".to_string(),
                header_markup: String::new(),
                content_markup: content.to_string(),
                upload_time: Utc.with_ymd_and_hms(2025, 1, 15, 16, 30, 0).unwrap(),
                update_time: None,
            },
            categories: Some(vec!["infrastructure".to_string(), "facility".to_string()]),
            location: Some(Coordinates {
                latitude: 47.656,
                longitude: -122.308,
            }),
        }
    }

    #[test]
    fn test_build_html_includes_enrichment() {
        let html = build_html(&sample_record("<p>Crews are responding.</p>"));

        assert!(html.contains("Water main break"));
        assert!(html.contains("https://alerts.example.edu/?p=42"));
        assert!(html.contains("infrastructure, facility"));
        assert!(html.contains("(47.656, -122.308)"));
        assert!(html.contains("Crews are responding."));
    }

    #[test]
    fn test_build_html_names_absent_fields() {
        let mut record = sample_record("<p>General update.</p>");
        record.categories = None;
        record.location = None;

        let html = build_html(&record);

        assert!(html.contains("Categories: none"));
        assert!(html.contains("Location: not resolved"));
    }

    #[test]
    fn test_build_html_truncates_long_content() {
        let long_body = format!("<p>{}</p>", "word ".repeat(500));
        let html = build_html(&sample_record(&long_body));

        // Title plus excerpt stay bounded no matter how long the post is
        assert!(html.len() < 1500);
    }

    #[tokio::test]
    async fn test_noop_notifier_always_succeeds() {
        let record = sample_record("<p>Anything.</p>");

        assert!(NoopNotifier.notify(&record).await.is_ok());
    }
}
