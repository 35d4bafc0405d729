//! Gemini provider implementing the [`Generator`] trait.
//!
//! Uses the non-streaming `generateContent` endpoint with API-key auth.
//! No streaming, no tool calls, no safety-setting overrides — the engine
//! only ever needs one text completion per call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::generator::{GenerateRequest, Generator, GeneratorError};

/// Default Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default client-level timeout bounding worst-case call latency.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Gemini provider configuration.
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// API key sent via the `x-goog-api-key` header.
    pub api_key: String,
    /// Model name (defaults to [`DEFAULT_MODEL`]).
    pub model: String,
    /// Override base URL (tests point this at a local mock).
    pub base_url: Option<String>,
    /// Override request timeout.
    pub timeout: Option<Duration>,
}

impl GeminiConfig {
    /// Config with the default model and timeout.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            base_url: None,
            timeout: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    #[serde(default)]
    message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────────────────────────────────────

/// Gemini text-generation provider.
#[derive(Debug)]
pub struct GeminiProvider {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new provider. Fails on a blank API key or an unbuildable
    /// HTTP client.
    pub fn new(config: GeminiConfig) -> Result<Self, GeneratorError> {
        if config.api_key.trim().is_empty() {
            return Err(GeneratorError::InvalidConfig("empty API key".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;
        Ok(Self { config, client })
    }

    /// Create a provider with a shared HTTP client.
    #[must_use]
    pub fn with_client(config: GeminiConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Model name this provider targets.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn build_headers(&self) -> Result<HeaderMap, GeneratorError> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let _ = headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.config.api_key).map_err(|e| {
                GeneratorError::InvalidConfig(format!("API key not header-safe: {e}"))
            })?,
        );
        Ok(headers)
    }

    fn endpoint(&self) -> String {
        let base = self.config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        format!(
            "{base}/v1beta/models/{model}:generateContent",
            model = self.config.model
        )
    }

    /// Pull the text out of a successful response.
    fn extract_text(response: GeminiResponse) -> Result<String, GeneratorError> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or(GeneratorError::EmptyResponse)?;
        let parts = candidate
            .content
            .ok_or(GeneratorError::EmptyResponse)?
            .parts;
        if parts.is_empty() {
            return Err(GeneratorError::EmptyResponse);
        }
        Ok(parts.into_iter().map(|p| p.text).collect::<String>())
    }
}

#[async_trait]
impl Generator for GeminiProvider {
    #[instrument(skip_all, fields(model = %self.config.model, prompt_len = request.prompt.len()))]
    async fn generate(&self, request: GenerateRequest) -> Result<String, GeneratorError> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: &request.prompt,
                }],
            }],
        };

        debug!("sending generateContent request");
        let response = self
            .client
            .post(self.endpoint())
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiErrorBody>(&body_text)
                .ok()
                .and_then(|b| b.error)
                .map_or_else(|| body_text.clone(), |e| e.message);
            error!(status = status.as_u16(), %message, "Gemini API error");
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GeminiResponse = response.json().await?;
        let text = Self::extract_text(parsed)?;
        debug!(response_len = text.len(), "received generation");
        Ok(text)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
