pub const MS_PER_MINUTE: i64 = 60_000;

/// Reason for the defensive no-candidate fallback. Analytics keys off it.
pub const NO_CONTEXT_REASON: &str = "No meetings scheduled or recently ended";

/// Sole signal reported for a forced mode.
pub const USER_SELECTION_SIGNAL: &str = "User selection";

/// Signal reported when every context slot is empty.
pub const NO_EVENTS_SIGNAL: &str = "No calendar events in window";

/// Denial reason while an editable field holds focus.
pub const TYPING_BLOCK_REASON: &str = "Cannot switch while user is typing.";

/// Denial reason when the proposal matches the displayed mode.
pub const SAME_MODE_REASON: &str = "Already in this mode";
