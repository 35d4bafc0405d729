//! # dojo-runtime
//!
//! Turn-by-turn control logic for mock interviews.
//!
//! - **Session store**: [`SessionStore`] — owns every session, serializes
//!   mutation, sweeps expired completed sessions on an injected clock.
//! - **Intent classifier**: [`IntentClassifier`] — clarification/off-topic/
//!   valid triage with a fail-open fallback.
//! - **Turn policy**: [`Interviewer`] — the state machine deciding between
//!   clarify, redirect, follow-up, new question, and conclusion.
//! - **Feedback compiler**: [`FeedbackCompiler`] — post-interview report
//!   with a deterministic neutral fallback.
//! - **Orchestrator**: [`Orchestrator`] — the one-call-per-turn facade the
//!   route layer talks to.
//!
//! ## Crate Position
//!
//! Aggregation layer. Depends on: dojo-core, dojo-llm.

#![deny(unsafe_code)]

pub mod clock;
pub mod errors;
pub mod feedback;
pub mod intent;
pub mod interviewer;
pub mod orchestrator;
pub mod prompts;
pub mod store;

#[cfg(test)]
mod testutil;

pub use clock::{Clock, SystemClock};
pub use errors::RuntimeError;
pub use feedback::{FeedbackCompiler, FeedbackReport};
pub use intent::{IntentAssessment, IntentClassifier};
pub use interviewer::{Interviewer, TurnBranch, TurnDecision};
pub use orchestrator::{ClarificationOutcome, InterviewStarted, Orchestrator, TurnOutcome};
pub use store::{SessionStats, SessionStore};
