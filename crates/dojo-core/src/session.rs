//! Session data model and the pure metadata merge.
//!
//! A [`Session`] is one complete interview attempt. The session store in
//! dojo-runtime owns every instance; everything here is plain data plus the
//! merge rules for per-turn metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::InterviewConfig;
use crate::ids::SessionId;

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Who spoke a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The agent conducting the interview.
    Interviewer,
    /// The human being interviewed.
    Candidate,
}

impl MessageRole {
    /// Upper-case label used when rendering transcripts into prompts.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Interviewer => "INTERVIEWER",
            Self::Candidate => "CANDIDATE",
        }
    }
}

/// One transcript entry. Append-only; never reordered or deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Speaker.
    pub role: MessageRole,
    /// Spoken/typed text.
    pub content: String,
    /// When the message was appended. Strictly increasing within a session.
    pub timestamp: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Metadata
// ─────────────────────────────────────────────────────────────────────────────

/// Per-answer quality judgment reported by the interviewer model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseQuality {
    /// Strong, complete answer.
    Excellent,
    /// Solid answer with minor gaps.
    Good,
    /// Acceptable but thin.
    Fair,
    /// Vague or off the mark.
    NeedsImprovement,
}

impl ResponseQuality {
    /// Numeric score on a 1–4 scale, used for averaging.
    #[must_use]
    pub fn score(self) -> u8 {
        match self {
            Self::Excellent => 4,
            Self::Good => 3,
            Self::Fair => 2,
            Self::NeedsImprovement => 1,
        }
    }
}

/// Cumulative session metadata, built up turn by turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    /// Topics touched so far — a deduplicated set kept in insertion order.
    pub topics_covered: Vec<String>,
    /// Quality trace, one entry per judged answer, in turn order.
    pub response_qualities: Vec<ResponseQuality>,
    /// Session creation time.
    pub start_time: DateTime<Utc>,
    /// Set exactly once, at completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// `end_time - start_time` in milliseconds, computed at completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    /// Last reported question type (behavioral/technical/situational/...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
    /// Last reported skill under assessment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_being_assessed: Option<String>,
    /// Last reported difficulty on a 1–5 scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<u8>,
    /// Last special action taken (`clarification` / `redirect`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_action: Option<String>,
}

impl SessionMetadata {
    /// Fresh metadata for a session created at `start_time`.
    #[must_use]
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            topics_covered: Vec::new(),
            response_qualities: Vec::new(),
            start_time,
            end_time: None,
            duration_ms: None,
            question_type: None,
            skill_being_assessed: None,
            difficulty_level: None,
            last_action: None,
        }
    }

    /// Merge one turn's reported metadata into the cumulative state.
    ///
    /// - `topics_covered` is a set union: case-sensitive, no duplicates,
    ///   idempotent (re-merging the same list is a no-op).
    /// - `response_quality` appends to the longitudinal quality trace.
    /// - Scalar fields are last-write-wins when present in the patch.
    pub fn merge(&mut self, patch: &MetadataPatch) {
        if let Some(topics) = &patch.topics_covered {
            for topic in topics {
                if !self.topics_covered.iter().any(|t| t == topic) {
                    self.topics_covered.push(topic.clone());
                }
            }
        }
        if let Some(quality) = patch.response_quality {
            self.response_qualities.push(quality);
        }
        if let Some(question_type) = &patch.question_type {
            self.question_type = Some(question_type.clone());
        }
        if let Some(skill) = &patch.skill_being_assessed {
            self.skill_being_assessed = Some(skill.clone());
        }
        if let Some(level) = patch.difficulty_level {
            self.difficulty_level = Some(level);
        }
        if let Some(action) = &patch.action {
            self.last_action = Some(action.clone());
        }
    }
}

/// One turn's reported metadata — the partial merged after every turn.
///
/// This is also the shape the interviewer model returns inside its JSON
/// replies, so every field is optional and unknown fields are tolerated.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPatch {
    /// Topics the latest turn touched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics_covered: Option<Vec<String>>,
    /// Quality of the latest answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_quality: Option<ResponseQuality>,
    /// Question type for the latest question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
    /// Skill the latest question assesses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_being_assessed: Option<String>,
    /// Difficulty on a 1–5 scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<u8>,
    /// Special action label (`clarification` / `redirect`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl MetadataPatch {
    /// Patch carrying only an action label.
    #[must_use]
    pub fn action(label: &str) -> Self {
        Self {
            action: Some(label.to_owned()),
            ..Self::default()
        }
    }

    /// True when nothing in the patch would change any metadata.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics_covered.is_none()
            && self.response_quality.is_none()
            && self.question_type.is_none()
            && self.skill_being_assessed.is_none()
            && self.difficulty_level.is_none()
            && self.action.is_none()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// Session lifecycle state. Terminal once completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Interview in progress.
    Active,
    /// Interview over; no further messages accepted.
    Completed,
}

/// One complete interview attempt, from start to feedback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque unique identifier.
    pub id: SessionId,
    /// Fixed configuration.
    pub config: InterviewConfig,
    /// Append-only transcript.
    pub messages: Vec<Message>,
    /// New (non-follow-up) questions asked so far. Never decreases.
    pub question_count: u32,
    /// Cumulative metadata.
    pub metadata: SessionMetadata,
    /// Lifecycle state.
    pub status: SessionStatus,
}

impl Session {
    /// Create a fresh active session.
    #[must_use]
    pub fn new(id: SessionId, config: InterviewConfig, start_time: DateTime<Utc>) -> Self {
        Self {
            id,
            config,
            messages: Vec::new(),
            question_count: 0,
            metadata: SessionMetadata::new(start_time),
            status: SessionStatus::Active,
        }
    }

    /// Whether the session has reached its terminal state.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    /// Most recent interviewer message, if any (used when clarifying).
    #[must_use]
    pub fn last_interviewer_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Interviewer)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
