//! Runtime error taxonomy.
//!
//! Only two things can actually fail a call: an unknown session id (a
//! client error, never retried) and a transport-level generation failure (a
//! "technical issue, please repeat" to the user). Malformed collaborator
//! output is never an error — every decode site recovers with its named
//! fallback.

use dojo_core::ids::SessionId;
use dojo_llm::GeneratorError;
use thiserror::Error;

/// Errors surfaced to the orchestrator's caller.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The referenced session does not exist in the store.
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    /// The generation collaborator could not be reached at all.
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}
