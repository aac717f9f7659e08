//! Title hygiene for human-readable reasons and explanations.
//!
//! Calendar titles are user-controlled and land verbatim in reasons,
//! capsules and audit payloads. This is the single place that bounds them.

/// Maximum meeting title length embedded in reasons (chars).
pub const MAX_TITLE_LEN: usize = 80;

/// Fallback used when a title is empty after normalization.
pub const UNTITLED_MEETING: &str = "Untitled meeting";

/// Maximum number of alternatives surfaced in an explanation.
pub const MAX_ALTERNATIVES: usize = 3;

/// Normalize a meeting title for display.
///
/// Applies:
/// 1. Whitespace normalization (newlines, tabs, runs of spaces -> one space)
/// 2. Char-boundary-safe truncation with an ellipsis
/// 3. Fallback for empty titles
pub fn display_title(raw: &str) -> String {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    if normalized.is_empty() {
        return UNTITLED_MEETING.to_string();
    }

    if normalized.chars().count() > MAX_TITLE_LEN {
        let truncated: String = normalized.chars().take(MAX_TITLE_LEN).collect();
        format!("{}...", truncated.trim_end())
    } else {
        normalized
    }
}
