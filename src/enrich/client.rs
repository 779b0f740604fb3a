//! Generative inference API client
//!
//! Thin adapter over the Generative Language `generateContent` endpoint.
//! Prompt construction lives in `prompts`; answer parsing lives in the
//! enrichment orchestrator.

use crate::config::EnrichmentConfig;
use crate::enrich::prompts::build_prompt;
use crate::enrich::{EnrichError, EnrichResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Which derivation a prompt asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Location,
    Categories,
}

/// Capability interface over the text inference API
#[async_trait]
pub trait EnrichmentClient: Send + Sync {
    /// Runs one prompt over the article text and returns the raw answer
    async fn infer(&self, kind: PromptKind, article_text: &str) -> EnrichResult<String>;
}

/// Client for the Generative Language API
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    categories: Vec<String>,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, config: &EnrichmentConfig, api_key: String) -> Self {
        Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            categories: config.categories.clone(),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "topP")]
    top_p: f64,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            response_mime_type: "text/plain",
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: String,
}

#[async_trait]
impl EnrichmentClient for GeminiClient {
    async fn infer(&self, kind: PromptKind, article_text: &str) -> EnrichResult<String> {
        let prompt = build_prompt(kind, article_text, &self.categories);
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: GenerationConfig::default(),
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        tracing::debug!("Inference request ({:?}) for model {}", kind, self.model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnrichError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| EnrichError::MalformedResponse(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| {
                EnrichError::MalformedResponse("response contained no candidates".to_string())
            })
    }
}
