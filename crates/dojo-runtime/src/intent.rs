//! Intent triage for incoming candidate messages.
//!
//! The judgment itself is delegated to the generation collaborator; this
//! module owns the request shape, the strict decode, and the fail-open
//! fallback. A classification that cannot be obtained or parsed must never
//! block the interview, so every failure path degrades to "valid response".

use dojo_core::json::decode_json_block;
use dojo_core::session::Session;
use dojo_llm::{GenerateRequest, Generator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::prompts;

/// Classification of one candidate message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentAssessment {
    /// The candidate is confused or asking for help.
    pub needs_clarification: bool,
    /// The message is unrelated to the interview.
    pub is_off_topic: bool,
    /// The message is a usable interview answer, even if imperfect.
    pub is_valid_response: bool,
    /// Brief explanation from the model.
    #[serde(default)]
    pub reason: String,
}

impl IntentAssessment {
    /// The fail-open value: treat the message as a valid answer.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            needs_clarification: false,
            is_off_topic: false,
            is_valid_response: true,
            reason: String::new(),
        }
    }
}

/// Classifies candidate messages via the generation collaborator.
pub struct IntentClassifier {
    generator: Arc<dyn Generator>,
}

impl IntentClassifier {
    /// Create a classifier backed by the given generator.
    #[must_use]
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Classify the latest candidate message in the session's context.
    ///
    /// Fails open: any generation or decode failure yields
    /// [`IntentAssessment::valid`] so the turn always proceeds.
    #[instrument(skip_all, fields(session_id = %session.id))]
    pub async fn classify(&self, message: &str, session: &Session) -> IntentAssessment {
        let prompt = prompts::intent_prompt(message, &session.config.role);
        match self.generator.generate(GenerateRequest::new(prompt)).await {
            Ok(text) => match decode_json_block::<IntentAssessment>(&text) {
                Ok(assessment) => {
                    debug!(
                        needs_clarification = assessment.needs_clarification,
                        is_off_topic = assessment.is_off_topic,
                        "intent classified"
                    );
                    assessment
                }
                Err(e) => {
                    warn!(error = %e, "unparseable intent assessment, failing open");
                    IntentAssessment::valid()
                }
            },
            Err(e) => {
                warn!(error = %e, "intent classification failed, failing open");
                IntentAssessment::valid()
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
