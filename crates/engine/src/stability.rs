//! Stability gate: decides whether a proposed mode may replace the current one.
//!
//! Guards run in a fixed order, cheapest and most important first:
//!
//! ```text
//! trigger allow-list -> (first evaluation: allow) -> mid-edit lockout
//!     -> minimum hold -> no-op
//! ```
//!
//! Focus is tracked through [`EditSession`] tokens rather than a bare flag,
//! so a stale blur can never clear a newer focus and a missed blur is
//! healed by the next focus.

use crate::constants::{SAME_MODE_REASON, TYPING_BLOCK_REASON};
use cadence_context::Mode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::str::FromStr;

/// What asked for an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Trigger {
    AppOpen,
    MeetingBoundaryChange,
    ExplicitUserAction,
    BlurFocus,
    IdleTimeout,
    BackgroundPoll,
    TabVisibility,
    /// Anything else. Always blocked.
    Unrecognized(String),
}

impl Trigger {
    pub fn parse(value: &str) -> Self {
        match value {
            "app_open" => Trigger::AppOpen,
            "meeting_boundary_change" => Trigger::MeetingBoundaryChange,
            "explicit_user_action" => Trigger::ExplicitUserAction,
            "blur_focus" => Trigger::BlurFocus,
            "idle_timeout" => Trigger::IdleTimeout,
            "background_poll" => Trigger::BackgroundPoll,
            "tab_visibility" => Trigger::TabVisibility,
            other => Trigger::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Trigger::AppOpen => "app_open",
            Trigger::MeetingBoundaryChange => "meeting_boundary_change",
            Trigger::ExplicitUserAction => "explicit_user_action",
            Trigger::BlurFocus => "blur_focus",
            Trigger::IdleTimeout => "idle_timeout",
            Trigger::BackgroundPoll => "background_poll",
            Trigger::TabVisibility => "tab_visibility",
            Trigger::Unrecognized(raw) => raw,
        }
    }

    /// Only these triggers may move the UI. Fail-closed for anything else.
    pub fn can_auto_switch(&self) -> bool {
        matches!(
            self,
            Trigger::AppOpen | Trigger::MeetingBoundaryChange | Trigger::ExplicitUserAction
        )
    }
}

impl FromStr for Trigger {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Trigger::parse(s))
    }
}

impl From<&str> for Trigger {
    fn from(value: &str) -> Self {
        Trigger::parse(value)
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Trigger {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Trigger {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Trigger::parse(&raw))
    }
}

/// Which guard denied a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    BlockedTrigger,
    InputFocused,
    MinimumHold,
    SameMode,
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::BlockedTrigger => "blocked_trigger",
            BlockReason::InputFocused => "input_focused",
            BlockReason::MinimumHold => "minimum_hold",
            BlockReason::SameMode => "same_mode",
        }
    }
}

/// A denied switch. Not an error - just nothing to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchDenial {
    pub blocked_by: BlockReason,
    pub reason: String,
    /// Time left on the hold timer (minimum hold only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub remaining_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchDecision {
    Allow,
    Deny(SwitchDenial),
}

impl SwitchDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, SwitchDecision::Allow)
    }

    fn deny(blocked_by: BlockReason, reason: impl Into<String>) -> Self {
        SwitchDecision::Deny(SwitchDenial {
            blocked_by,
            reason: reason.into(),
            remaining_ms: None,
        })
    }
}

/// How an edit session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditEnd {
    Blur,
    Submit,
    Cancel,
}

/// Proof of focus on an editable field. Hand it back to end the session.
///
/// Not `Clone`: one focus, one release.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an edit session keeps the gate locked until it is ended"]
pub struct EditSession {
    id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputFocus {
    Unfocused,
    Focused { session: u64 },
}

/// Mode that was last committed, and when.
#[derive(Debug, Clone)]
struct CommittedMode {
    mode: Mode,
    plan_id: String,
    /// Hysteresis anchor (epoch ms).
    switched_at_ms: i64,
}

/// Read-only view of the gate, for hosts and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StabilitySnapshot {
    pub current_mode: Option<Mode>,
    pub current_plan_id: Option<String>,
    pub last_switch_time: Option<i64>,
    pub is_input_focused: bool,
    pub minimum_hold_ms: u64,
}

/// Session-lived switch authorization state.
#[derive(Debug, Clone)]
pub struct StabilityGate {
    minimum_hold_ms: u64,
    committed: Option<CommittedMode>,
    focus: InputFocus,
    last_session_id: u64,
}

impl StabilityGate {
    pub fn new(minimum_hold_ms: u64) -> Self {
        Self {
            minimum_hold_ms,
            committed: None,
            focus: InputFocus::Unfocused,
            last_session_id: 0,
        }
    }

    pub fn current_mode(&self) -> Option<Mode> {
        self.committed.as_ref().map(|c| c.mode)
    }

    pub fn is_input_focused(&self) -> bool {
        matches!(self.focus, InputFocus::Focused { .. })
    }

    pub fn snapshot(&self) -> StabilitySnapshot {
        StabilitySnapshot {
            current_mode: self.current_mode(),
            current_plan_id: self.committed.as_ref().map(|c| c.plan_id.clone()),
            last_switch_time: self.committed.as_ref().map(|c| c.switched_at_ms),
            is_input_focused: self.is_input_focused(),
            minimum_hold_ms: self.minimum_hold_ms,
        }
    }

    /// Whether `proposed` may replace the current mode at `now_ms`.
    pub fn can_switch(&self, proposed: Mode, trigger: &Trigger, now_ms: i64) -> SwitchDecision {
        if !trigger.can_auto_switch() {
            return SwitchDecision::deny(
                BlockReason::BlockedTrigger,
                format!("Trigger '{}' is not allowed to switch modes", trigger),
            );
        }

        // First evaluation of the session always initializes.
        let Some(committed) = &self.committed else {
            return SwitchDecision::Allow;
        };

        if self.is_input_focused() {
            return SwitchDecision::deny(BlockReason::InputFocused, TYPING_BLOCK_REASON);
        }

        let elapsed_ms = u64::try_from(now_ms.saturating_sub(committed.switched_at_ms)).unwrap_or(0);
        if elapsed_ms < self.minimum_hold_ms {
            let remaining_ms = self.minimum_hold_ms - elapsed_ms;
            return SwitchDecision::Deny(SwitchDenial {
                blocked_by: BlockReason::MinimumHold,
                reason: format!(
                    "Minimum hold time not met ({}s remaining)",
                    remaining_ms.div_ceil(1000)
                ),
                remaining_ms: Some(remaining_ms),
            });
        }

        if proposed == committed.mode {
            return SwitchDecision::deny(BlockReason::SameMode, SAME_MODE_REASON);
        }

        SwitchDecision::Allow
    }

    /// Record a committed switch. Restarts the hold timer.
    pub fn after_switch(&mut self, mode: Mode, plan_id: String, now_ms: i64) {
        self.committed = Some(CommittedMode {
            mode,
            plan_id,
            switched_at_ms: now_ms,
        });
    }

    /// An editable field gained focus. Supersedes any earlier session.
    pub fn begin_edit(&mut self) -> EditSession {
        self.last_session_id += 1;
        let id = self.last_session_id;
        if let InputFocus::Focused { session } = self.focus {
            tracing::debug!(superseded = session, session = id, "edit session replaced");
        }
        self.focus = InputFocus::Focused { session: id };
        EditSession { id }
    }

    /// End an edit session. Returns whether focus was released.
    ///
    /// A token from a superseded session is ignored.
    pub fn end_edit(&mut self, session: EditSession, how: EditEnd) -> bool {
        match self.focus {
            InputFocus::Focused { session: active } if active == session.id => {
                self.focus = InputFocus::Unfocused;
                tracing::debug!(session = session.id, ?how, "edit session ended");
                true
            }
            _ => {
                tracing::warn!(session = session.id, ?how, "ignoring stale edit session");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: i64 = 1_700_000_000_000;

    fn initialized(mode: Mode) -> StabilityGate {
        let mut gate = StabilityGate::new(5_000);
        gate.after_switch(mode, "plan-1".to_string(), T);
        gate
    }

    fn blocked_by(decision: SwitchDecision) -> BlockReason {
        match decision {
            SwitchDecision::Deny(denial) => denial.blocked_by,
            SwitchDecision::Allow => panic!("expected denial"),
        }
    }

    #[test]
    fn test_trigger_parsing() {
        assert_eq!(Trigger::parse("app_open"), Trigger::AppOpen);
        assert_eq!("tab_visibility".parse::<Trigger>().unwrap(), Trigger::TabVisibility);
        assert_eq!(
            Trigger::from("window_resize"),
            Trigger::Unrecognized("window_resize".to_string())
        );
        assert_eq!(Trigger::Unrecognized("x".to_string()).as_str(), "x");
    }

    #[test]
    fn test_trigger_allow_list() {
        assert!(Trigger::AppOpen.can_auto_switch());
        assert!(Trigger::MeetingBoundaryChange.can_auto_switch());
        assert!(Trigger::ExplicitUserAction.can_auto_switch());
        assert!(!Trigger::BlurFocus.can_auto_switch());
        assert!(!Trigger::IdleTimeout.can_auto_switch());
        assert!(!Trigger::BackgroundPoll.can_auto_switch());
        assert!(!Trigger::TabVisibility.can_auto_switch());
        assert!(!Trigger::parse("").can_auto_switch());
    }

    #[test]
    fn test_trigger_serde_round_trip() {
        let json = serde_json::to_string(&Trigger::MeetingBoundaryChange).unwrap();
        assert_eq!(json, "\"meeting_boundary_change\"");
        let parsed: Trigger = serde_json::from_str("\"focus_lost\"").unwrap();
        assert_eq!(parsed, Trigger::Unrecognized("focus_lost".to_string()));
    }

    #[test]
    fn test_first_evaluation_allows() {
        let gate = StabilityGate::new(5_000);
        assert!(gate.can_switch(Mode::NeutralIntent, &Trigger::AppOpen, T).is_allowed());
    }

    #[test]
    fn test_blocked_trigger_denied_even_uninitialized() {
        let gate = StabilityGate::new(5_000);
        let decision = gate.can_switch(Mode::MeetingCapture, &Trigger::TabVisibility, T);
        assert_eq!(blocked_by(decision), BlockReason::BlockedTrigger);
    }

    #[test]
    fn test_blocked_trigger_checked_before_focus() {
        let mut gate = initialized(Mode::NeutralIntent);
        let _session = gate.begin_edit();
        let decision = gate.can_switch(Mode::MeetingCapture, &Trigger::BackgroundPoll, T + 60_000);
        assert_eq!(blocked_by(decision), BlockReason::BlockedTrigger);
    }

    #[test]
    fn test_focus_blocks_before_hold() {
        let mut gate = initialized(Mode::NeutralIntent);
        let _session = gate.begin_edit();
        let decision = gate.can_switch(Mode::MeetingCapture, &Trigger::ExplicitUserAction, T + 1_000);
        match decision {
            SwitchDecision::Deny(denial) => {
                assert_eq!(denial.blocked_by, BlockReason::InputFocused);
                assert_eq!(denial.reason, "Cannot switch while user is typing.");
            }
            SwitchDecision::Allow => panic!("expected denial"),
        }
    }

    #[test]
    fn test_minimum_hold() {
        let gate = initialized(Mode::MeetingPrep);
        match gate.can_switch(Mode::MeetingCapture, &Trigger::MeetingBoundaryChange, T + 2_000) {
            SwitchDecision::Deny(denial) => {
                assert_eq!(denial.blocked_by, BlockReason::MinimumHold);
                assert_eq!(denial.remaining_ms, Some(3_000));
                assert_eq!(denial.reason, "Minimum hold time not met (3s remaining)");
            }
            SwitchDecision::Allow => panic!("expected denial"),
        }
        // Boundary is inclusive: exactly the hold has elapsed.
        assert!(gate
            .can_switch(Mode::MeetingCapture, &Trigger::MeetingBoundaryChange, T + 5_000)
            .is_allowed());
    }

    #[test]
    fn test_remaining_seconds_round_up() {
        let gate = initialized(Mode::MeetingPrep);
        match gate.can_switch(Mode::MeetingCapture, &Trigger::AppOpen, T + 4_500) {
            SwitchDecision::Deny(denial) => {
                assert_eq!(denial.reason, "Minimum hold time not met (1s remaining)")
            }
            SwitchDecision::Allow => panic!("expected denial"),
        }
    }

    #[test]
    fn test_clock_going_backwards_holds() {
        let gate = initialized(Mode::MeetingPrep);
        let decision = gate.can_switch(Mode::MeetingCapture, &Trigger::AppOpen, T - 10_000);
        assert_eq!(blocked_by(decision), BlockReason::MinimumHold);
    }

    #[test]
    fn test_same_mode_after_hold() {
        let gate = initialized(Mode::MeetingPrep);
        let decision = gate.can_switch(Mode::MeetingPrep, &Trigger::AppOpen, T + 10_000);
        assert_eq!(blocked_by(decision), BlockReason::SameMode);
    }

    #[test]
    fn test_hold_checked_before_same_mode() {
        let gate = initialized(Mode::MeetingPrep);
        let decision = gate.can_switch(Mode::MeetingPrep, &Trigger::AppOpen, T + 1_000);
        assert_eq!(blocked_by(decision), BlockReason::MinimumHold);
    }

    #[test]
    fn test_after_switch_restarts_hold() {
        let mut gate = initialized(Mode::MeetingPrep);
        gate.after_switch(Mode::MeetingCapture, "plan-2".to_string(), T + 6_000);
        let snapshot = gate.snapshot();
        assert_eq!(snapshot.current_mode, Some(Mode::MeetingCapture));
        assert_eq!(snapshot.current_plan_id.as_deref(), Some("plan-2"));
        assert_eq!(snapshot.last_switch_time, Some(T + 6_000));
        let decision = gate.can_switch(Mode::NeutralIntent, &Trigger::AppOpen, T + 7_000);
        assert_eq!(blocked_by(decision), BlockReason::MinimumHold);
    }

    #[test]
    fn test_edit_session_round_trip() {
        let mut gate = initialized(Mode::NeutralIntent);
        let session = gate.begin_edit();
        assert!(gate.is_input_focused());
        assert!(gate.end_edit(session, EditEnd::Submit));
        assert!(!gate.is_input_focused());
    }

    #[test]
    fn test_stale_session_does_not_release_newer_focus() {
        let mut gate = initialized(Mode::NeutralIntent);
        let first = gate.begin_edit();
        let second = gate.begin_edit();
        assert!(!gate.end_edit(first, EditEnd::Blur));
        assert!(gate.is_input_focused());
        assert!(gate.end_edit(second, EditEnd::Blur));
        assert!(!gate.is_input_focused());
    }

    #[test]
    fn test_snapshot_uninitialized() {
        let gate = StabilityGate::new(5_000);
        let snapshot = gate.snapshot();
        assert_eq!(snapshot.current_mode, None);
        assert_eq!(snapshot.minimum_hold_ms, 5_000);
        assert!(!snapshot.is_input_focused);
    }

    #[test]
    fn test_block_reason_wire_names() {
        assert_eq!(
            serde_json::to_string(&BlockReason::BlockedTrigger).unwrap(),
            "\"blocked_trigger\""
        );
        assert_eq!(BlockReason::MinimumHold.as_str(), "minimum_hold");
    }
}
