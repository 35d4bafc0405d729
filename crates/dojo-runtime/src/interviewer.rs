//! The turn policy state machine.
//!
//! Given a classified candidate message and the current session state, the
//! [`Interviewer`] decides the next action: clarify, redirect, follow up,
//! advance to a new question, or conclude. It owns the two invariants that
//! matter most here:
//!
//! - a follow-up never consumes a question slot;
//! - completion is decided by the question count, not by the model. The
//!   model's own `isComplete` judgment is advisory wording only.
//!
//! Malformed model output during a valid turn still moves the interview
//! forward: the raw text becomes the spoken message and the turn counts as
//! a new question. Silent stalling is worse than a possibly-redundant
//! question.

use std::sync::Arc;

use dojo_core::constants::MAX_QUESTIONS;
use dojo_core::json::decode_json_block;
use dojo_core::session::{MetadataPatch, Session};
use dojo_llm::{GenerateRequest, Generator, GeneratorError};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::intent::IntentAssessment;
use crate::prompts;

/// Which branch of the policy produced a turn's response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnBranch {
    /// A new question on a new topic.
    Normal,
    /// Probing the same question again.
    FollowUp,
    /// Rephrasing for a confused candidate.
    Clarify,
    /// Steering an off-topic candidate back.
    Redirect,
    /// The concluding turn.
    Final,
}

/// The policy's decision for one turn. The orchestrator applies it to the
/// session through the store.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnDecision {
    /// Interviewer message to speak.
    pub message: String,
    /// Branch taken.
    pub branch: TurnBranch,
    /// Whether this turn consumes a question slot.
    pub counts_question: bool,
    /// Whether the interview is over after this turn.
    pub is_complete: bool,
    /// Metadata to merge into the session.
    pub metadata: MetadataPatch,
}

/// Opening move: first interviewer message plus its metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct StartDecision {
    /// First interviewer message.
    pub message: String,
    /// Metadata to merge into the session.
    pub metadata: MetadataPatch,
}

/// Clarify/redirect response produced outside the question flow.
#[derive(Clone, Debug, PartialEq)]
pub struct AsideDecision {
    /// Interviewer message to speak.
    pub message: String,
    /// Metadata to merge (carries the `action` label).
    pub metadata: MetadataPatch,
}

// ─────────────────────────────────────────────────────────────────────────────
// Model reply shapes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartReply {
    message: String,
    #[serde(default)]
    metadata: MetadataPatch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TurnReply {
    message: String,
    #[serde(default)]
    is_follow_up: bool,
    /// Advisory only; the count-based rule owns the truth.
    #[serde(default)]
    is_complete: bool,
    #[serde(default)]
    metadata: MetadataPatch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AsideReply {
    message: String,
    #[serde(default)]
    metadata: MetadataPatch,
}

// ─────────────────────────────────────────────────────────────────────────────
// Interviewer
// ─────────────────────────────────────────────────────────────────────────────

/// The turn policy, backed by the generation collaborator.
pub struct Interviewer {
    generator: Arc<dyn Generator>,
}

impl Interviewer {
    /// Create an interviewer backed by the given generator.
    #[must_use]
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Produce the opening message for a fresh session.
    ///
    /// Consumes no user input. A transport failure propagates (the caller
    /// cannot start an interview without any first question); unparseable
    /// output falls back to the raw text with introduction metadata.
    #[instrument(skip_all, fields(session_id = %session.id))]
    pub async fn start(&self, session: &Session) -> Result<StartDecision, GeneratorError> {
        let prompt = prompts::start_prompt(&session.config);
        let text = self.generator.generate(GenerateRequest::new(prompt)).await?;
        match decode_json_block::<StartReply>(&text) {
            Ok(reply) => Ok(StartDecision {
                message: reply.message,
                metadata: reply.metadata,
            }),
            Err(e) => {
                warn!(error = %e, "unparseable opening reply, using raw text");
                Ok(StartDecision {
                    message: text,
                    metadata: MetadataPatch {
                        question_type: Some("behavioral".to_owned()),
                        skill_being_assessed: Some("introduction".to_owned()),
                        difficulty_level: Some(1),
                        ..MetadataPatch::default()
                    },
                })
            }
        }
    }

    /// Decide the next turn for a classified candidate message.
    #[instrument(skip_all, fields(session_id = %session.id, question_count = session.question_count))]
    pub async fn next_turn(
        &self,
        session: &Session,
        user_message: &str,
        intent: &IntentAssessment,
    ) -> Result<TurnDecision, GeneratorError> {
        if intent.needs_clarification {
            let aside = self.clarify(session, user_message).await?;
            return Ok(TurnDecision {
                message: aside.message,
                branch: TurnBranch::Clarify,
                counts_question: false,
                is_complete: false,
                metadata: aside.metadata,
            });
        }

        if intent.is_off_topic {
            let aside = self.redirect(session, user_message).await?;
            return Ok(TurnDecision {
                message: aside.message,
                branch: TurnBranch::Redirect,
                counts_question: false,
                is_complete: false,
                metadata: aside.metadata,
            });
        }

        let prompt = prompts::continuation_prompt(session, user_message);
        let text = self.generator.generate(GenerateRequest::new(prompt)).await?;
        Ok(match decode_json_block::<TurnReply>(&text) {
            Ok(reply) => {
                let counts_question = !reply.is_follow_up;
                let count_after = session.question_count + u32::from(counts_question);
                let is_complete = count_after >= MAX_QUESTIONS;
                if reply.is_complete != is_complete {
                    debug!(
                        advisory = reply.is_complete,
                        authoritative = is_complete,
                        "model completion judgment overridden by question count"
                    );
                }
                let branch = if is_complete {
                    TurnBranch::Final
                } else if reply.is_follow_up {
                    TurnBranch::FollowUp
                } else {
                    TurnBranch::Normal
                };
                TurnDecision {
                    message: reply.message,
                    branch,
                    counts_question,
                    is_complete,
                    metadata: reply.metadata,
                }
            }
            Err(e) => {
                // Forward progress over strict correctness: surface the raw
                // text and treat the turn as a new question.
                warn!(error = %e, "unparseable turn reply, counting as a new question");
                let count_after = session.question_count + 1;
                let is_complete = count_after >= MAX_QUESTIONS;
                TurnDecision {
                    message: text,
                    branch: if is_complete {
                        TurnBranch::Final
                    } else {
                        TurnBranch::Normal
                    },
                    counts_question: true,
                    is_complete,
                    metadata: MetadataPatch::default(),
                }
            }
        })
    }

    /// Rephrase the current question for a confused candidate.
    pub async fn clarify(
        &self,
        session: &Session,
        user_message: &str,
    ) -> Result<AsideDecision, GeneratorError> {
        let last_question = session
            .last_interviewer_message()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let prompt =
            prompts::clarification_prompt(user_message, &last_question, &session.config.role);
        self.aside(prompt, "clarification").await
    }

    /// Steer an off-topic candidate back to the interview.
    pub async fn redirect(
        &self,
        session: &Session,
        user_message: &str,
    ) -> Result<AsideDecision, GeneratorError> {
        let prompt = prompts::redirect_prompt(user_message, &session.config.role);
        self.aside(prompt, "redirect").await
    }

    async fn aside(&self, prompt: String, action: &str) -> Result<AsideDecision, GeneratorError> {
        let text = self.generator.generate(GenerateRequest::new(prompt)).await?;
        Ok(match decode_json_block::<AsideReply>(&text) {
            Ok(reply) => AsideDecision {
                message: reply.message,
                metadata: if reply.metadata.is_empty() {
                    MetadataPatch::action(action)
                } else {
                    reply.metadata
                },
            },
            Err(e) => {
                warn!(error = %e, action, "unparseable aside reply, using raw text");
                AsideDecision {
                    message: text,
                    metadata: MetadataPatch::action(action),
                }
            }
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
