//! The text-generation capability contract.

use async_trait::async_trait;
use thiserror::Error;

/// A structured generation request.
///
/// The engine always asks for a JSON-shaped answer inside the prompt; the
/// reply is still plain text and must go through the strict decode boundary
/// in dojo-core before anything trusts it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Fully rendered prompt text.
    pub prompt: String,
}

impl GenerateRequest {
    /// Build a request from a rendered prompt.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Failures while obtaining generated text.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("generation request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("generation API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// The API answered successfully but produced no text.
    #[error("generation API returned no candidates")]
    EmptyResponse,

    /// The provider was constructed with unusable configuration.
    #[error("invalid generator configuration: {0}")]
    InvalidConfig(String),
}

/// External text-generation capability.
///
/// Implementations submit a structured request and return natural-language
/// or JSON text. The engine owns the protocol around this call — prompt
/// construction, strict decoding, and all fallback policy.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate text for the given request.
    async fn generate(&self, request: GenerateRequest) -> Result<String, GeneratorError>;
}
