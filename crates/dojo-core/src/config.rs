//! Per-session interview configuration.

use serde::{Deserialize, Serialize};

/// Candidate experience level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperienceLevel {
    /// Early career.
    Junior,
    /// The default when the caller does not specify a level.
    #[default]
    MidLevel,
    /// Senior individual contributor.
    Senior,
    /// Staff level.
    Staff,
    /// Principal level.
    Principal,
}

impl ExperienceLevel {
    /// Kebab-case label, as rendered into prompts.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Junior => "junior",
            Self::MidLevel => "mid-level",
            Self::Senior => "senior",
            Self::Staff => "staff",
            Self::Principal => "principal",
        }
    }
}

/// Interview configuration, fixed for the session's lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewConfig {
    /// Target role (e.g. `"software-engineer"`).
    pub role: String,
    /// Candidate experience level.
    #[serde(default)]
    pub experience_level: ExperienceLevel,
    /// Optional focus areas the interviewer should emphasize.
    #[serde(default)]
    pub focus_areas: Vec<String>,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            role: "general".to_owned(),
            experience_level: ExperienceLevel::default(),
            focus_areas: Vec::new(),
        }
    }
}

impl InterviewConfig {
    /// Build a config from caller-supplied parts, applying defaults.
    ///
    /// A missing or blank role falls back to `"general"`, a missing level to
    /// mid-level, missing focus areas to an empty list.
    #[must_use]
    pub fn normalized(
        role: Option<String>,
        experience_level: Option<ExperienceLevel>,
        focus_areas: Option<Vec<String>>,
    ) -> Self {
        let role = role
            .map(|r| r.trim().to_owned())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "general".to_owned());
        Self {
            role,
            experience_level: experience_level.unwrap_or_default(),
            focus_areas: focus_areas.unwrap_or_default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
