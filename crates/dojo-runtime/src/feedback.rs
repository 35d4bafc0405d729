//! Post-interview feedback compilation.
//!
//! Runs once, after the session completes, over the full unwindowed
//! transcript. Compilation is infallible from the caller's point of view:
//! if the analysis cannot be obtained or parsed, a neutral fallback report
//! is returned so the candidate always gets something.

use std::sync::Arc;

use dojo_core::json::decode_json_block;
use dojo_core::session::Session;
use dojo_llm::{GenerateRequest, Generator};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::prompts;

// ─────────────────────────────────────────────────────────────────────────────
// Report shape
// ─────────────────────────────────────────────────────────────────────────────

/// One concrete strength observed in the interview.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strength {
    /// Skill or behavior area.
    pub area: String,
    /// What the candidate actually said or did.
    pub evidence: String,
    /// Why it matters.
    pub impact: String,
}

/// One concrete improvement opportunity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Improvement {
    /// Skill or behavior area.
    pub area: String,
    /// What went wrong.
    pub issue: String,
    /// How to do better.
    pub suggestion: String,
    /// A reworked example answer.
    pub example: String,
}

/// Score and short note for one skill dimension.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillScore {
    /// 1–10.
    pub score: u8,
    /// Brief justification.
    pub notes: String,
}

impl SkillScore {
    fn neutral() -> Self {
        Self {
            score: 5,
            notes: "Unable to assess".to_owned(),
        }
    }
}

/// Scores across the five assessed dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillScores {
    /// Clarity and structure of answers.
    pub communication: SkillScore,
    /// Domain and technical depth.
    pub technical_knowledge: SkillScore,
    /// Analytical approach.
    pub problem_solving: SkillScore,
    /// Collaboration and values signals.
    pub culture_fit: SkillScore,
    /// Composure and conviction.
    pub confidence: SkillScore,
}

/// Whether the candidate structured behavioral answers well.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarMethodUsage {
    /// Whether Situation/Task/Action/Result structure was observed.
    pub used: bool,
    /// Advice on applying it.
    pub feedback: String,
}

/// The complete post-interview report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackReport {
    /// Overall performance, 1–10.
    pub overall_score: u8,
    /// Two or three sentence assessment.
    pub summary: String,
    /// Observed strengths with evidence.
    pub strengths: Vec<Strength>,
    /// Improvement opportunities with suggestions.
    pub improvements: Vec<Improvement>,
    /// Per-dimension scores.
    pub skill_scores: SkillScores,
    /// STAR-method assessment.
    pub star_method_usage: StarMethodUsage,
    /// The single highest-leverage improvement.
    pub top_priority_action: String,
    /// How a real interviewer would likely read the candidate.
    pub interviewer_perspective: String,
}

impl FeedbackReport {
    /// Neutral report used when analysis is unavailable. All scores sit at
    /// the midpoint so the fallback never reads as a judgment.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            overall_score: 5,
            summary: "Interview completed. Detailed analysis unavailable.".to_owned(),
            strengths: vec![Strength {
                area: "Participation".to_owned(),
                evidence: "Completed the interview".to_owned(),
                impact: "Practice builds confidence".to_owned(),
            }],
            improvements: vec![Improvement {
                area: "General".to_owned(),
                issue: "Analysis unavailable".to_owned(),
                suggestion: "Try another practice interview".to_owned(),
                example: String::new(),
            }],
            skill_scores: SkillScores {
                communication: SkillScore::neutral(),
                technical_knowledge: SkillScore::neutral(),
                problem_solving: SkillScore::neutral(),
                culture_fit: SkillScore::neutral(),
                confidence: SkillScore::neutral(),
            },
            star_method_usage: StarMethodUsage {
                used: false,
                feedback: "Structure behavioral answers as Situation, Task, Action, Result."
                    .to_owned(),
            },
            top_priority_action: "Keep practicing with full-length interviews".to_owned(),
            interviewer_perspective: "The candidate completed a full practice session.".to_owned(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Compiler
// ─────────────────────────────────────────────────────────────────────────────

/// Compiles a feedback report from a completed session's transcript.
pub struct FeedbackCompiler {
    generator: Arc<dyn Generator>,
}

impl FeedbackCompiler {
    /// Create a compiler backed by the given generator.
    #[must_use]
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Analyze the session and produce a report.
    ///
    /// Never fails: generation or decode problems degrade to
    /// [`FeedbackReport::fallback`].
    #[instrument(skip_all, fields(session_id = %session.id, messages = session.messages.len()))]
    pub async fn compile(&self, session: &Session) -> FeedbackReport {
        let prompt = prompts::feedback_prompt(session);
        match self.generator.generate(GenerateRequest::new(prompt)).await {
            Ok(text) => match decode_json_block::<FeedbackReport>(&text) {
                Ok(report) => {
                    info!(overall_score = report.overall_score, "feedback compiled");
                    report
                }
                Err(e) => {
                    warn!(error = %e, "unparseable feedback, using fallback report");
                    FeedbackReport::fallback()
                }
            },
            Err(e) => {
                warn!(error = %e, "feedback generation failed, using fallback report");
                FeedbackReport::fallback()
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
