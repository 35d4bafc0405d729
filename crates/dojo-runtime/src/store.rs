//! Session store — exclusive owner of every interview session.
//!
//! All mutation goes through `&self` methods on [`SessionStore`]; callers
//! only ever receive cloned snapshots, never references into the map. A
//! missing id is signalled with `None` (the caller translates that into a
//! user-facing "session not found"), not an error — absence is a normal
//! condition for the store.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use dashmap::DashMap;
use dojo_core::config::InterviewConfig;
use dojo_core::constants::MAX_QUESTIONS;
use dojo_core::ids::SessionId;
use dojo_core::session::{Message, MessageRole, MetadataPatch, Session, SessionStatus};
use tracing::{debug, instrument, warn};

use crate::clock::Clock;

/// Point-in-time summary of a session's progress.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionStats {
    /// New questions asked so far.
    pub question_count: u32,
    /// Deduplicated topics covered.
    pub topics_covered: Vec<String>,
    /// Mean answer quality on a 1–4 scale; 0.0 before any judged answer.
    pub average_quality: f64,
    /// Elapsed time — final duration once completed, running otherwise.
    pub duration_ms: i64,
}

/// In-memory session store with time-based eviction of completed sessions.
pub struct SessionStore {
    sessions: DashMap<SessionId, Session>,
    clock: Arc<dyn Clock>,
    retention: Duration,
}

impl SessionStore {
    /// Create a store with the given clock and retention window for
    /// completed sessions.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, retention: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            clock,
            retention,
        }
    }

    /// Create a new active session from caller-supplied config.
    ///
    /// The config is normalized (role/level/focus-area defaults) and the id
    /// is freshly generated, collision-free across live sessions.
    #[instrument(skip_all, fields(role = %config.role))]
    pub fn create(&self, config: InterviewConfig) -> Session {
        let id = SessionId::generate();
        let config = InterviewConfig::normalized(
            Some(config.role),
            Some(config.experience_level),
            Some(config.focus_areas),
        );
        let session = Session::new(id.clone(), config, self.clock.now());
        let _ = self.sessions.insert(id.clone(), session.clone());
        debug!(session_id = %id, "session created");
        session
    }

    /// Snapshot of a session by id. No side effects.
    #[must_use]
    pub fn get(&self, id: &SessionId) -> Option<Session> {
        self.sessions.get(id).map(|s| s.clone())
    }

    /// Number of live (active or retained completed) sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store holds no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Append a timestamped message to a session's transcript.
    ///
    /// Timestamps are strictly increasing: if the clock has not advanced
    /// since the previous message, the new timestamp is bumped past it.
    /// Completed sessions accept no further messages; the append is dropped
    /// and the unchanged snapshot returned.
    pub fn append_message(
        &self,
        id: &SessionId,
        role: MessageRole,
        content: &str,
    ) -> Option<Session> {
        let mut entry = self.sessions.get_mut(id)?;
        if entry.status == SessionStatus::Completed {
            warn!(session_id = %id, "message dropped — session already completed");
            return Some(entry.clone());
        }
        let mut timestamp = self.clock.now();
        if let Some(last) = entry.messages.last() {
            if timestamp <= last.timestamp {
                timestamp = last.timestamp + TimeDelta::milliseconds(1);
            }
        }
        entry.messages.push(Message {
            role,
            content: content.to_owned(),
            timestamp,
        });
        Some(entry.clone())
    }

    /// Merge one turn's metadata into a session.
    ///
    /// Set-union for topics, append-only for qualities, last-write-wins for
    /// scalars — see [`dojo_core::session::SessionMetadata::merge`].
    pub fn merge_metadata(&self, id: &SessionId, patch: &MetadataPatch) -> Option<Session> {
        let mut entry = self.sessions.get_mut(id)?;
        entry.metadata.merge(patch);
        Some(entry.clone())
    }

    /// Count one new (non-follow-up) question. Returns the updated count.
    ///
    /// The count is clamped at [`MAX_QUESTIONS`]; an attempt to go past the
    /// cap is an internal invariant violation and is logged, not propagated.
    pub fn record_question(&self, id: &SessionId) -> Option<u32> {
        let mut entry = self.sessions.get_mut(id)?;
        if entry.question_count >= MAX_QUESTIONS {
            warn!(
                session_id = %id,
                count = entry.question_count,
                "question count already at cap, clamping"
            );
        } else {
            entry.question_count += 1;
        }
        Some(entry.question_count)
    }

    /// Transition a session to completed, stamping end time and duration.
    ///
    /// Idempotent: completing an already-completed session returns it
    /// unchanged, with the original end time and duration.
    #[instrument(skip(self), fields(session_id = %id))]
    pub fn complete(&self, id: &SessionId) -> Option<Session> {
        let mut entry = self.sessions.get_mut(id)?;
        if entry.status == SessionStatus::Completed {
            return Some(entry.clone());
        }
        let end_time = self.clock.now();
        entry.status = SessionStatus::Completed;
        entry.metadata.end_time = Some(end_time);
        entry.metadata.duration_ms = Some(
            end_time
                .signed_duration_since(entry.metadata.start_time)
                .num_milliseconds(),
        );
        debug!("session completed");
        Some(entry.clone())
    }

    /// Remove completed sessions older than the retention window.
    ///
    /// Active sessions are never swept regardless of age — losing an
    /// in-progress interview is worse than retaining an abandoned one.
    /// Returns the number of sessions removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| {
            if session.status != SessionStatus::Completed {
                return true;
            }
            let age = now.signed_duration_since(session.metadata.start_time);
            match age.to_std() {
                Ok(age) => age <= self.retention,
                // Negative age means the clock moved backwards; keep it.
                Err(_) => true,
            }
        });
        let removed = before - self.sessions.len();
        if removed > 0 {
            debug!(removed, "swept expired sessions");
        }
        removed
    }

    /// Spawn a background task sweeping on a fixed interval.
    ///
    /// Sweeping only ever targets completed sessions, which are never
    /// mutated again, so it needs no coordination with in-flight turns.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                let _ = ticker.tick().await;
                let _ = store.sweep();
            }
        })
    }

    /// Progress summary for a session.
    #[must_use]
    pub fn stats(&self, id: &SessionId) -> Option<SessionStats> {
        let session = self.get(id)?;
        let qualities = &session.metadata.response_qualities;
        let average_quality = if qualities.is_empty() {
            0.0
        } else {
            let total: u32 = qualities.iter().map(|q| u32::from(q.score())).sum();
            f64::from(total) / qualities.len() as f64
        };
        let duration_ms = session.metadata.duration_ms.unwrap_or_else(|| {
            self.clock
                .now()
                .signed_duration_since(session.metadata.start_time)
                .num_milliseconds()
        });
        Some(SessionStats {
            question_count: session.question_count,
            topics_covered: session.metadata.topics_covered.clone(),
            average_quality,
            duration_ms,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
