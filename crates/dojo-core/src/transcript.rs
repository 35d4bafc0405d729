//! Transcript rendering for generation requests.
//!
//! Turn-level calls see only a bounded window of recent messages to keep
//! prompt size in check; feedback compilation sees the whole transcript.

use crate::session::Message;

/// Render the most recent `window` messages as role-prefixed lines.
///
/// ```text
/// INTERVIEWER: Tell me about a challenging bug.
/// CANDIDATE: Last year we hit a race condition...
/// ```
#[must_use]
pub fn format_history(messages: &[Message], window: usize) -> String {
    let start = messages.len().saturating_sub(window);
    messages[start..]
        .iter()
        .map(|m| format!("{}: {}", m.role.label(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the full transcript with 1-based turn numbers.
///
/// ```text
/// [1] INTERVIEWER: Tell me about yourself.
///
/// [2] CANDIDATE: I started as...
/// ```
#[must_use]
pub fn format_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .enumerate()
        .map(|(i, m)| format!("[{}] {}: {}", i + 1, m.role.label(), m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MessageRole;
    use chrono::Utc;

    fn message(role: MessageRole, content: &str) -> Message {
        Message {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    fn sample(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                let role = if i % 2 == 0 {
                    MessageRole::Interviewer
                } else {
                    MessageRole::Candidate
                };
                message(role, &format!("message {i}"))
            })
            .collect()
    }

    #[test]
    fn history_empty() {
        assert_eq!(format_history(&[], 10), "");
    }

    #[test]
    fn history_role_prefixes() {
        let messages = sample(2);
        let rendered = format_history(&messages, 10);
        assert_eq!(rendered, "INTERVIEWER: message 0\nCANDIDATE: message 1");
    }

    #[test]
    fn history_respects_window() {
        let messages = sample(15);
        let rendered = format_history(&messages, 10);
        assert_eq!(rendered.lines().count(), 10);
        // Oldest surviving line is message 5.
        assert!(rendered.starts_with("CANDIDATE: message 5"));
        assert!(rendered.ends_with("INTERVIEWER: message 14"));
    }

    #[test]
    fn history_window_larger_than_transcript() {
        let messages = sample(3);
        assert_eq!(format_history(&messages, 10).lines().count(), 3);
    }

    #[test]
    fn transcript_numbers_from_one() {
        let messages = sample(2);
        let rendered = format_transcript(&messages);
        assert_eq!(
            rendered,
            "[1] INTERVIEWER: message 0\n\n[2] CANDIDATE: message 1"
        );
    }

    #[test]
    fn transcript_is_unbounded() {
        let messages = sample(40);
        let rendered = format_transcript(&messages);
        assert!(rendered.contains("[1] "));
        assert!(rendered.contains("[40] "));
    }

    #[test]
    fn transcript_empty() {
        assert_eq!(format_transcript(&[]), "");
    }
}
