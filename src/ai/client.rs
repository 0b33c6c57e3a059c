//! Generative-text client. Gemini's `generateContent` endpoint, key held server-side.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AiConfig;

const REQUEST_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 10;
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI features require an API key to be configured")]
    NotConfigured,
    #[error("{0}")]
    InvalidInput(String),
    #[error("AI request failed: {0}")]
    Request(String),
    #[error("AI API returned status {status}")]
    Response { status: u16, body: String },
    #[error("could not parse AI response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationOptions {
    /// Ask the model for `application/json` output.
    pub json: bool,
    pub temperature: Option<f32>,
}

#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str, options: GenerationOptions) -> Result<String, AiError>;
}

/// Stand-in used when no API key is configured.
pub struct DisabledModel;

#[async_trait]
impl TextModel for DisabledModel {
    async fn generate(&self, _prompt: &str, _options: GenerationOptions) -> Result<String, AiError> {
        Err(AiError::NotConfigured)
    }
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: &str, base_url: &str) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| AiError::Request(e.to_string()))?;
        Ok(Self {
            http,
            api_key,
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AiConfig) -> Result<Option<Self>, AiError> {
        config
            .api_key
            .clone()
            .map(|key| Self::new(key, &config.model, &config.base_url))
            .transpose()
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, prompt: &str, options: GenerationOptions) -> Result<String, AiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: options.json.then_some("application/json"),
                temperature: options.temperature,
            },
        };
        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AiError::Request(e.to_string()))?;
        if status != 200 {
            warn!(status, model = %self.model, "AI API error");
            return Err(AiError::Response { status, body: text });
        }
        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| AiError::Parse(e.to_string()))?;
        let output = parsed.text();
        debug!(model = %self.model, chars = output.len(), "AI response received");
        Ok(output)
    }
}

// wire types

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}
