//! The one-call-per-turn facade over the whole engine.
//!
//! The orchestrator wires the store, classifier, turn policy, and feedback
//! compiler together and serializes turns per session: a tokio mutex per
//! session id is held across the whole turn, so two concurrent responds on
//! the same session observe each other's appended messages and counts.
//! Different sessions never contend.

use std::sync::Arc;

use dashmap::DashMap;
use dojo_core::config::InterviewConfig;
use dojo_core::ids::SessionId;
use dojo_core::session::{MessageRole, Session, SessionMetadata};
use dojo_llm::Generator;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::errors::RuntimeError;
use crate::feedback::{FeedbackCompiler, FeedbackReport};
use crate::intent::IntentClassifier;
use crate::interviewer::Interviewer;
use crate::store::{SessionStats, SessionStore};

/// Spoken when a candidate keeps answering after the interview concluded.
const CONCLUDED_MESSAGE: &str =
    "This interview has concluded. Request your feedback report to see how you did.";

/// How many trailing messages a snapshot carries.
const SNAPSHOT_WINDOW: usize = 10;

/// Result of starting an interview.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewStarted {
    /// Id for all subsequent calls.
    pub session_id: SessionId,
    /// Opening interviewer message.
    pub message: String,
    /// Session metadata after the opening turn.
    pub metadata: SessionMetadata,
}

/// Result of one candidate turn.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    /// Interviewer's reply.
    pub message: String,
    /// Whether the interview is now over.
    pub is_complete: bool,
    /// New questions asked so far.
    pub question_number: u32,
    /// Session metadata after the turn.
    pub metadata: SessionMetadata,
}

/// Result of an explicit clarification request.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClarificationOutcome {
    /// Interviewer's rephrasing.
    pub message: String,
    /// Session metadata after the clarification.
    pub metadata: SessionMetadata,
}

/// Facade owning one turn's worth of control flow per call.
pub struct Orchestrator {
    store: Arc<SessionStore>,
    classifier: IntentClassifier,
    interviewer: Interviewer,
    feedback: FeedbackCompiler,
    turn_locks: DashMap<SessionId, Arc<Mutex<()>>>,
}

impl Orchestrator {
    /// Wire an orchestrator over a store and a generation collaborator.
    #[must_use]
    pub fn new(store: Arc<SessionStore>, generator: Arc<dyn Generator>) -> Self {
        Self {
            store,
            classifier: IntentClassifier::new(Arc::clone(&generator)),
            interviewer: Interviewer::new(Arc::clone(&generator)),
            feedback: FeedbackCompiler::new(generator),
            turn_locks: DashMap::new(),
        }
    }

    /// Get or create the turn lock for a session.
    ///
    /// Callers verify the session exists first, and every path that
    /// concludes a session removes its entry, so the map only ever holds
    /// locks for live, active sessions.
    fn turn_lock(&self, id: &SessionId) -> Arc<Mutex<()>> {
        self.turn_locks.entry(id.clone()).or_default().clone()
    }

    fn session(&self, id: &SessionId) -> Result<Session, RuntimeError> {
        self.store
            .get(id)
            .ok_or_else(|| RuntimeError::SessionNotFound(id.clone()))
    }

    fn concluded_outcome(session: Session) -> TurnOutcome {
        TurnOutcome {
            message: CONCLUDED_MESSAGE.to_owned(),
            is_complete: true,
            question_number: session.question_count,
            metadata: session.metadata,
        }
    }

    /// Create a session and produce the opening interviewer message.
    #[instrument(skip_all, fields(role = %config.role))]
    pub async fn start_interview(
        &self,
        config: InterviewConfig,
    ) -> Result<InterviewStarted, RuntimeError> {
        let session = self.store.create(config);
        let decision = self.interviewer.start(&session).await?;

        if !decision.metadata.is_empty() {
            let _ = self.store.merge_metadata(&session.id, &decision.metadata);
        }
        let updated = self
            .store
            .append_message(&session.id, MessageRole::Interviewer, &decision.message)
            .ok_or_else(|| RuntimeError::SessionNotFound(session.id.clone()))?;

        info!(session_id = %session.id, "interview started");
        Ok(InterviewStarted {
            session_id: session.id,
            message: decision.message,
            metadata: updated.metadata,
        })
    }

    /// Process one candidate message end to end.
    ///
    /// A message to an already-concluded session is answered with a fixed
    /// wrap-up and no collaborator calls.
    #[instrument(skip_all, fields(session_id = %id))]
    pub async fn respond(
        &self,
        id: &SessionId,
        message: &str,
    ) -> Result<TurnOutcome, RuntimeError> {
        let session = self.session(id)?;
        if session.is_completed() {
            return Ok(Self::concluded_outcome(session));
        }

        let lock = self.turn_lock(id);
        let _guard = lock.lock().await;

        // The session may have concluded while we waited for the lock.
        let session = self.session(id)?;
        if session.is_completed() {
            let _ = self.turn_locks.remove(id);
            return Ok(Self::concluded_outcome(session));
        }

        let session = self
            .store
            .append_message(id, MessageRole::Candidate, message)
            .ok_or_else(|| RuntimeError::SessionNotFound(id.clone()))?;

        let intent = self.classifier.classify(message, &session).await;
        let decision = self.interviewer.next_turn(&session, message, &intent).await?;

        if decision.counts_question {
            let _ = self.store.record_question(id);
        }
        if !decision.metadata.is_empty() {
            let _ = self.store.merge_metadata(id, &decision.metadata);
        }
        let _ = self
            .store
            .append_message(id, MessageRole::Interviewer, &decision.message);
        if decision.is_complete {
            let _ = self.store.complete(id);
            let _ = self.turn_locks.remove(id);
            info!("interview concluded");
        }

        let updated = self.session(id)?;
        Ok(TurnOutcome {
            message: decision.message,
            is_complete: decision.is_complete,
            question_number: updated.question_count,
            metadata: updated.metadata,
        })
    }

    /// Rephrase the current question without advancing the interview.
    ///
    /// Only the interviewer's reply joins the transcript; the help request
    /// itself is not an answer and is not recorded.
    #[instrument(skip_all, fields(session_id = %id))]
    pub async fn handle_clarification(
        &self,
        id: &SessionId,
        message: &str,
    ) -> Result<ClarificationOutcome, RuntimeError> {
        let _ = self.session(id)?;
        let lock = self.turn_lock(id);
        let _guard = lock.lock().await;

        let session = self.session(id)?;
        let decision = self.interviewer.clarify(&session, message).await?;

        if !decision.metadata.is_empty() {
            let _ = self.store.merge_metadata(id, &decision.metadata);
        }
        let updated = self
            .store
            .append_message(id, MessageRole::Interviewer, &decision.message)
            .ok_or_else(|| RuntimeError::SessionNotFound(id.clone()))?;
        if updated.is_completed() {
            let _ = self.turn_locks.remove(id);
        }

        Ok(ClarificationOutcome {
            message: decision.message,
            metadata: updated.metadata,
        })
    }

    /// Conclude the session (if it is not already) and compile the report.
    ///
    /// Completion happens first so the report always describes a finished
    /// interview with a stamped duration. Analysis failures degrade to the
    /// neutral fallback report rather than erroring.
    #[instrument(skip_all, fields(session_id = %id))]
    pub async fn request_feedback(&self, id: &SessionId) -> Result<FeedbackReport, RuntimeError> {
        let session = self.session(id)?;
        let session = if session.is_completed() {
            session
        } else {
            let lock = self.turn_lock(id);
            let _guard = lock.lock().await;
            let completed = self
                .store
                .complete(id)
                .ok_or_else(|| RuntimeError::SessionNotFound(id.clone()))?;
            let _ = self.turn_locks.remove(id);
            completed
        };
        Ok(self.feedback.compile(&session).await)
    }

    /// Session snapshot with the transcript bounded to its recent tail.
    pub fn session_snapshot(&self, id: &SessionId) -> Result<Session, RuntimeError> {
        let mut session = self.session(id)?;
        if session.messages.len() > SNAPSHOT_WINDOW {
            session.messages = session
                .messages
                .split_off(session.messages.len() - SNAPSHOT_WINDOW);
        }
        Ok(session)
    }

    /// Progress summary for a session.
    pub fn session_stats(&self, id: &SessionId) -> Result<SessionStats, RuntimeError> {
        self.store
            .stats(id)
            .ok_or_else(|| RuntimeError::SessionNotFound(id.clone()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::manual::ManualClock;
    use crate::clock::Clock;
    use crate::testutil::ScriptedGenerator;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use dojo_core::constants::MAX_QUESTIONS;
    use std::time::Duration;

    fn t0() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    fn orchestrator() -> (Arc<ScriptedGenerator>, Arc<SessionStore>, Orchestrator) {
        let generator = Arc::new(ScriptedGenerator::new());
        let store = Arc::new(SessionStore::new(
            Arc::new(ManualClock::starting_at(t0())) as Arc<dyn Clock>,
            Duration::from_secs(3600),
        ));
        let orch = Orchestrator::new(
            Arc::clone(&store),
            Arc::clone(&generator) as Arc<dyn Generator>,
        );
        (generator, store, orch)
    }

    fn push_valid_intent(generator: &ScriptedGenerator) {
        generator.push_ok(
            r#"{"needsClarification": false, "isOffTopic": false, "isValidResponse": true}"#,
        );
    }

    fn push_new_question(generator: &ScriptedGenerator, text: &str) {
        generator.push_ok(&format!(
            r#"{{"message": "{text}", "isFollowUp": false, "isComplete": false, "metadata": {{"responseQuality": "good", "topicsCovered": ["{text}"]}}}}"#,
        ));
    }

    async fn started(
        generator: &ScriptedGenerator,
        orch: &Orchestrator,
    ) -> InterviewStarted {
        generator.push_ok(
            r#"{"message": "Welcome! Tell me about yourself.", "metadata": {"questionType": "behavioral", "skillBeingAssessed": "introduction", "difficultyLevel": 1}}"#,
        );
        orch.start_interview(InterviewConfig::default()).await.unwrap()
    }

    // ── start_interview ──────────────────────────────────────────────────

    #[tokio::test]
    async fn start_creates_session_and_appends_opening() {
        let (generator, store, orch) = orchestrator();
        let outcome = started(&generator, &orch).await;

        assert_eq!(outcome.message, "Welcome! Tell me about yourself.");
        assert_eq!(outcome.metadata.question_type.as_deref(), Some("behavioral"));

        let session = store.get(&outcome.session_id).unwrap();
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].role, MessageRole::Interviewer);
        assert_eq!(session.question_count, 0);
    }

    #[tokio::test]
    async fn start_with_prose_opening_still_starts() {
        let (generator, store, orch) = orchestrator();
        generator.push_ok("Hi! Let's get going. Tell me about yourself.");
        let outcome = orch.start_interview(InterviewConfig::default()).await.unwrap();

        assert_eq!(outcome.message, "Hi! Let's get going. Tell me about yourself.");
        assert_eq!(
            outcome.metadata.skill_being_assessed.as_deref(),
            Some("introduction")
        );
        assert_eq!(store.get(&outcome.session_id).unwrap().messages.len(), 1);
    }

    // ── respond: the full interview arc ──────────────────────────────────

    #[tokio::test]
    async fn six_answers_conclude_the_interview() {
        let (generator, store, orch) = orchestrator();
        let start = started(&generator, &orch).await;

        for i in 0..MAX_QUESTIONS {
            push_valid_intent(&generator);
            push_new_question(&generator, &format!("topic-{i}"));
            let outcome = orch
                .respond(&start.session_id, &format!("answer {i}"))
                .await
                .unwrap();
            assert_eq!(outcome.question_number, i + 1);
            assert_eq!(outcome.is_complete, i + 1 == MAX_QUESTIONS);
        }

        let session = store.get(&start.session_id).unwrap();
        assert!(session.is_completed());
        assert_eq!(session.question_count, MAX_QUESTIONS);
        // Opening + 6 candidate/interviewer pairs.
        assert_eq!(session.messages.len(), 1 + 2 * MAX_QUESTIONS as usize);
        assert_eq!(session.metadata.response_qualities.len(), MAX_QUESTIONS as usize);
        assert_eq!(session.metadata.topics_covered.len(), MAX_QUESTIONS as usize);
        assert!(session.metadata.end_time.is_some());
    }

    #[tokio::test]
    async fn answer_after_conclusion_gets_fixed_wrap_up() {
        let (generator, store, orch) = orchestrator();
        let start = started(&generator, &orch).await;
        let _ = store.complete(&start.session_id).unwrap();

        // Script is empty: any collaborator call would panic the test.
        let outcome = orch.respond(&start.session_id, "one more?").await.unwrap();
        assert!(outcome.is_complete);
        assert_eq!(outcome.message, CONCLUDED_MESSAGE);

        // Nothing was appended.
        assert_eq!(store.get(&start.session_id).unwrap().messages.len(), 1);
    }

    #[tokio::test]
    async fn follow_up_does_not_advance_the_count() {
        let (generator, _, orch) = orchestrator();
        let start = started(&generator, &orch).await;

        push_valid_intent(&generator);
        generator.push_ok(
            r#"{"message": "Go deeper on that.", "isFollowUp": true, "isComplete": false}"#,
        );
        let outcome = orch.respond(&start.session_id, "brief answer").await.unwrap();
        assert_eq!(outcome.question_number, 0);
        assert!(!outcome.is_complete);
    }

    #[tokio::test]
    async fn off_topic_answer_is_redirected_without_counting() {
        let (generator, store, orch) = orchestrator();
        let start = started(&generator, &orch).await;

        generator.push_ok(
            r#"{"needsClarification": false, "isOffTopic": true, "isValidResponse": false}"#,
        );
        generator.push_ok(
            r#"{"message": "Let's get back to the interview.", "metadata": {"action": "redirect"}}"#,
        );
        let outcome = orch.respond(&start.session_id, "did you see the game?").await.unwrap();

        assert_eq!(outcome.message, "Let's get back to the interview.");
        assert_eq!(outcome.question_number, 0);
        assert!(!outcome.is_complete);

        let session = store.get(&start.session_id).unwrap();
        // Both the off-topic message and the redirect are on the record.
        assert_eq!(session.messages.len(), 3);
        assert_eq!(session.metadata.last_action.as_deref(), Some("redirect"));
    }

    #[tokio::test]
    async fn confused_answer_is_clarified_without_counting() {
        let (generator, store, orch) = orchestrator();
        let start = started(&generator, &orch).await;

        generator.push_ok(
            r#"{"needsClarification": true, "isOffTopic": false, "isValidResponse": false}"#,
        );
        generator.push_ok(
            r#"{"message": "In other words: walk me through your background.", "metadata": {"action": "clarification"}}"#,
        );
        let outcome = orch.respond(&start.session_id, "what do you mean?").await.unwrap();

        assert_eq!(outcome.question_number, 0);
        let session = store.get(&start.session_id).unwrap();
        assert_eq!(session.metadata.last_action.as_deref(), Some("clarification"));
    }

    #[tokio::test]
    async fn malformed_turn_reply_still_advances() {
        let (generator, store, orch) = orchestrator();
        let start = started(&generator, &orch).await;

        push_valid_intent(&generator);
        generator.push_ok("Interesting! Now tell me about a conflict you resolved.");
        let outcome = orch.respond(&start.session_id, "my answer").await.unwrap();

        assert_eq!(
            outcome.message,
            "Interesting! Now tell me about a conflict you resolved."
        );
        assert_eq!(outcome.question_number, 1);
        assert!(!outcome.is_complete);
        assert_eq!(store.get(&start.session_id).unwrap().messages.len(), 3);
    }

    #[tokio::test]
    async fn respond_to_unknown_session_is_not_found() {
        let (_, _, orch) = orchestrator();
        let err = orch
            .respond(&SessionId::from("nope"), "hello")
            .await
            .unwrap_err();
        assert_matches!(err, RuntimeError::SessionNotFound(_));
    }

    // ── handle_clarification ─────────────────────────────────────────────

    #[tokio::test]
    async fn clarification_records_only_the_reply() {
        let (generator, store, orch) = orchestrator();
        let start = started(&generator, &orch).await;

        generator.push_ok(
            r#"{"message": "Sure - I mean your work history.", "metadata": {"action": "clarification"}}"#,
        );
        let outcome = orch
            .handle_clarification(&start.session_id, "which part?")
            .await
            .unwrap();

        assert_eq!(outcome.message, "Sure - I mean your work history.");
        let session = store.get(&start.session_id).unwrap();
        // Opening + clarification reply; the help request itself is absent.
        assert_eq!(session.messages.len(), 2);
        assert!(session.messages.iter().all(|m| m.role == MessageRole::Interviewer));
    }

    // ── request_feedback ─────────────────────────────────────────────────

    #[tokio::test]
    async fn feedback_completes_the_session_first() {
        let (generator, store, orch) = orchestrator();
        let start = started(&generator, &orch).await;

        // Unparseable analysis: the caller still gets the neutral report.
        generator.push_ok("They did fine I suppose.");
        let report = orch.request_feedback(&start.session_id).await.unwrap();
        assert_eq!(report, FeedbackReport::fallback());

        let session = store.get(&start.session_id).unwrap();
        assert!(session.is_completed());
        assert!(session.metadata.duration_ms.is_some());
    }

    #[tokio::test]
    async fn feedback_on_empty_session_is_the_neutral_fallback() {
        let (generator, store, orch) = orchestrator();
        // Created but never started: zero messages, zero questions.
        let session = store.create(InterviewConfig::default());

        generator.push_ok("There is nothing here to analyze.");
        let report = orch.request_feedback(&session.id).await.unwrap();
        assert_eq!(report, FeedbackReport::fallback());

        let completed = store.get(&session.id).unwrap();
        assert!(completed.is_completed());
        assert!(completed.messages.is_empty());
    }

    #[tokio::test]
    async fn feedback_on_unknown_session_is_not_found() {
        let (_, _, orch) = orchestrator();
        let err = orch
            .request_feedback(&SessionId::from("nope"))
            .await
            .unwrap_err();
        assert_matches!(err, RuntimeError::SessionNotFound(_));
    }

    // ── turn lock lifecycle ──────────────────────────────────────────────

    #[tokio::test]
    async fn unknown_ids_leave_no_turn_locks() {
        let (_, _, orch) = orchestrator();
        for i in 0..5 {
            let id = SessionId::from(format!("ghost-{i}"));
            assert_matches!(
                orch.respond(&id, "hello").await,
                Err(RuntimeError::SessionNotFound(_))
            );
            assert_matches!(
                orch.request_feedback(&id).await,
                Err(RuntimeError::SessionNotFound(_))
            );
            assert_matches!(
                orch.handle_clarification(&id, "?").await,
                Err(RuntimeError::SessionNotFound(_))
            );
        }
        assert!(orch.turn_locks.is_empty());
    }

    #[tokio::test]
    async fn concluding_turn_releases_the_lock() {
        let (generator, _, orch) = orchestrator();
        let start = started(&generator, &orch).await;

        for i in 0..MAX_QUESTIONS {
            push_valid_intent(&generator);
            push_new_question(&generator, &format!("topic-{i}"));
            let _ = orch
                .respond(&start.session_id, &format!("answer {i}"))
                .await
                .unwrap();
        }
        assert!(orch.turn_locks.is_empty());

        // A late answer to the concluded session does not recreate one.
        let outcome = orch.respond(&start.session_id, "hello?").await.unwrap();
        assert!(outcome.is_complete);
        assert!(orch.turn_locks.is_empty());
    }

    #[tokio::test]
    async fn feedback_request_releases_the_lock() {
        let (generator, _, orch) = orchestrator();
        let start = started(&generator, &orch).await;

        generator.push_ok("They did fine I suppose.");
        let _ = orch.request_feedback(&start.session_id).await.unwrap();
        assert!(orch.turn_locks.is_empty());

        // A repeat request on the concluded session stays lock-free.
        generator.push_ok("Still nothing structured.");
        let _ = orch.request_feedback(&start.session_id).await.unwrap();
        assert!(orch.turn_locks.is_empty());
    }

    // ── snapshots and stats ──────────────────────────────────────────────

    #[tokio::test]
    async fn snapshot_bounds_the_transcript() {
        let (generator, store, orch) = orchestrator();
        let start = started(&generator, &orch).await;
        for i in 0..12 {
            let _ = store.append_message(
                &start.session_id,
                MessageRole::Candidate,
                &format!("filler {i}"),
            );
        }

        let snapshot = orch.session_snapshot(&start.session_id).unwrap();
        assert_eq!(snapshot.messages.len(), SNAPSHOT_WINDOW);
        assert_eq!(snapshot.messages.last().unwrap().content, "filler 11");
        // The store still holds the full transcript.
        assert_eq!(store.get(&start.session_id).unwrap().messages.len(), 13);
    }

    #[tokio::test]
    async fn stats_reflect_judged_answers() {
        let (generator, _, orch) = orchestrator();
        let start = started(&generator, &orch).await;

        push_valid_intent(&generator);
        push_new_question(&generator, "ownership");
        let _ = orch.respond(&start.session_id, "my answer").await.unwrap();

        let stats = orch.session_stats(&start.session_id).unwrap();
        assert_eq!(stats.question_count, 1);
        assert_eq!(stats.topics_covered, vec!["ownership"]);
        assert!((stats.average_quality - 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn snapshot_of_unknown_session_is_not_found() {
        let (_, _, orch) = orchestrator();
        assert_matches!(
            orch.session_snapshot(&SessionId::from("nope")),
            Err(RuntimeError::SessionNotFound(_))
        );
    }
}
