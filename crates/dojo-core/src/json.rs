//! Strict decode boundary for untrusted model output.
//!
//! Generation replies are requested as JSON but arrive as free text, often
//! wrapped in Markdown code fences. Callers strip the fencing, attempt a
//! strict decode into the expected shape, and on any error apply their own
//! named fallback value — the parse error itself never propagates past the
//! call site.

use serde::de::DeserializeOwned;

/// Strip an optional Markdown code fence (with or without a `json` tag)
/// from around `text`. Text without fencing is returned trimmed.
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Strictly decode a fence-wrapped JSON payload into `T`.
pub fn decode_json_block<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(strip_code_fences(text))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
