//! Decision capsules: the human-auditable "why" behind a mode.
//!
//! Everything here is derived from the selection and the context. No clock,
//! no randomness: the same inputs always produce the same capsule.

use crate::selector::{alternatives, signals_used, would_change_if, ModeCandidate, ModeSelectionResult};
use cadence_context::limits::display_title;
use cadence_context::{Confidence, MeetingContext, Mode};
use serde::{Deserialize, Serialize};

/// What an action does when clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    SwitchMode { mode: Mode },
    SetIntent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapsuleAction {
    pub label: String,
    pub kind: ActionKind,
}

impl CapsuleAction {
    fn switch_to(mode: Mode) -> Self {
        Self {
            label: format!("Switch to {}", mode.label()),
            kind: ActionKind::SwitchMode { mode },
        }
    }

    fn switch_mode_kind(&self) -> Option<Mode> {
        match self.kind {
            ActionKind::SwitchMode { mode } => Some(mode),
            ActionKind::SetIntent => None,
        }
    }
}

/// Justification for the proposed mode. Safe to discard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionCapsule {
    pub view_label: String,
    pub confidence: Confidence,
    pub reason: String,
    pub signals_used: Vec<String>,
    pub alternatives_considered: Vec<ModeCandidate>,
    pub would_change_if: Vec<String>,
    pub actions: Vec<CapsuleAction>,
}

/// A soft nudge toward the neighbouring meeting. Never changes the mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjacencySuggestion {
    pub mode: Mode,
    pub meeting_id: String,
    pub message: String,
}

/// Build the capsule for `selection` in `context`.
pub fn explain(selection: &ModeSelectionResult, context: &MeetingContext) -> DecisionCapsule {
    let alternatives_considered = alternatives(context, selection.mode);

    DecisionCapsule {
        view_label: selection.mode.label().to_string(),
        confidence: selection.confidence,
        reason: selection.reason.clone(),
        signals_used: signals_used(context),
        actions: actions_for(selection.mode, &alternatives_considered),
        alternatives_considered,
        would_change_if: would_change_if(selection.mode)
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

fn actions_for(mode: Mode, alternatives: &[ModeCandidate]) -> Vec<CapsuleAction> {
    let mut actions: Vec<CapsuleAction> = Vec::new();

    for candidate in alternatives {
        let surfaced = actions
            .iter()
            .any(|a| a.switch_mode_kind() == Some(candidate.mode));
        if !surfaced {
            actions.push(CapsuleAction::switch_to(candidate.mode));
        }
    }

    match mode {
        Mode::NeutralIntent => actions.push(CapsuleAction {
            label: "Set an intent".to_string(),
            kind: ActionKind::SetIntent,
        }),
        Mode::MeetingPrep => {
            let has_synthesis = alternatives
                .iter()
                .any(|c| c.mode == Mode::MeetingSynthesisMin);
            if !has_synthesis {
                actions.push(CapsuleAction::switch_to(Mode::MeetingSynthesisMin));
            }
        }
        Mode::MeetingSynthesisMin => actions.push(CapsuleAction {
            label: "Done reviewing".to_string(),
            kind: ActionKind::SwitchMode {
                mode: Mode::NeutralIntent,
            },
        }),
        Mode::MeetingCapture | Mode::AgenticWorkSurface => {}
    }

    actions
}

/// At most one nudge: prep with a last meeting suggests reviewing it,
/// synthesis with a next meeting suggests prepping for it.
pub fn adjacency_suggestion(mode: Mode, context: &MeetingContext) -> Option<AdjacencySuggestion> {
    match mode {
        Mode::MeetingPrep => context.last_meeting.as_ref().map(|meeting| AdjacencySuggestion {
            mode: Mode::MeetingSynthesisMin,
            meeting_id: meeting.id.clone(),
            message: format!("Review notes from {}", display_title(&meeting.title)),
        }),
        Mode::MeetingSynthesisMin => {
            context.next_meeting.as_ref().map(|meeting| AdjacencySuggestion {
                mode: Mode::MeetingPrep,
                meeting_id: meeting.id.clone(),
                message: format!("Prepare for {}", display_title(&meeting.title)),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::select_mode;
    use cadence_context::{resolve_context, CalendarEvent, TimingConfig};

    const MIN: i64 = 60_000;
    const T: i64 = 1_700_000_000_000;

    fn capsule_for(events: &[CalendarEvent]) -> (ModeSelectionResult, DecisionCapsule) {
        let config = TimingConfig::default();
        let context = resolve_context(events, T, &config);
        let selection = select_mode(&context, &config);
        let capsule = explain(&selection, &context);
        (selection, capsule)
    }

    #[test]
    fn test_neutral_capsule() {
        let (selection, capsule) = capsule_for(&[]);
        assert_eq!(selection.mode, Mode::NeutralIntent);
        assert_eq!(capsule.view_label, "Neutral");
        assert_eq!(capsule.confidence, Confidence::Low);
        assert_eq!(capsule.signals_used, vec!["No calendar events in window"]);
        assert!(capsule.alternatives_considered.is_empty());
        assert_eq!(capsule.would_change_if.len(), 3);
        assert_eq!(
            capsule.actions,
            vec![CapsuleAction {
                label: "Set an intent".to_string(),
                kind: ActionKind::SetIntent,
            }]
        );
    }

    #[test]
    fn test_prep_with_last_meeting() {
        let events = [
            CalendarEvent::new("a", "Planning", T + 20 * MIN, T + 50 * MIN),
            CalendarEvent::new("b", "Retro", T - 90 * MIN, T - 30 * MIN),
        ];
        let (selection, capsule) = capsule_for(&events);
        assert_eq!(selection.mode, Mode::MeetingPrep);
        assert_eq!(capsule.alternatives_considered.len(), 1);
        assert_eq!(capsule.alternatives_considered[0].mode, Mode::MeetingSynthesisMin);
        // Synthesis already surfaced as an alternative: no extra escape hatch.
        assert_eq!(capsule.actions.len(), 1);
        assert_eq!(capsule.actions[0].label, "Switch to Meeting Synthesis");
    }

    #[test]
    fn test_prep_alone_gets_synthesis_escape_hatch() {
        let events = [CalendarEvent::new("a", "Planning", T + 20 * MIN, T + 50 * MIN)];
        let (_, capsule) = capsule_for(&events);
        assert_eq!(
            capsule.actions,
            vec![CapsuleAction {
                label: "Switch to Meeting Synthesis".to_string(),
                kind: ActionKind::SwitchMode {
                    mode: Mode::MeetingSynthesisMin
                },
            }]
        );
    }

    #[test]
    fn test_synthesis_done_reviewing() {
        let events = [CalendarEvent::new("b", "Retro", T - 90 * MIN, T - 30 * MIN)];
        let (selection, capsule) = capsule_for(&events);
        assert_eq!(selection.mode, Mode::MeetingSynthesisMin);
        let last = capsule.actions.last().unwrap();
        assert_eq!(last.label, "Done reviewing");
        assert_eq!(
            last.kind,
            ActionKind::SwitchMode {
                mode: Mode::NeutralIntent
            }
        );
    }

    #[test]
    fn test_capture_lists_other_slots() {
        let events = [
            CalendarEvent::new("live", "Standup", T - 5 * MIN, T + 10 * MIN),
            CalendarEvent::new("next", "Planning", T + 30 * MIN, T + 60 * MIN),
        ];
        let (selection, capsule) = capsule_for(&events);
        assert_eq!(selection.mode, Mode::MeetingCapture);
        assert_eq!(capsule.actions.len(), 1);
        assert_eq!(capsule.actions[0].label, "Switch to Meeting Prep");
        assert_eq!(capsule.signals_used.len(), 2);
    }

    #[test]
    fn test_explain_is_idempotent() {
        let events = [
            CalendarEvent::new("a", "Planning", T + 20 * MIN, T + 50 * MIN),
            CalendarEvent::new("b", "Retro", T - 90 * MIN, T - 30 * MIN),
        ];
        let config = TimingConfig::default();
        let context = resolve_context(&events, T, &config);
        let selection = select_mode(&context, &config);
        let first = serde_json::to_string(&explain(&selection, &context)).unwrap();
        let second = serde_json::to_string(&explain(&selection, &context)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_adjacency_prep_suggests_review() {
        let config = TimingConfig::default();
        let events = [
            CalendarEvent::new("a", "Planning", T + 20 * MIN, T + 50 * MIN),
            CalendarEvent::new("b", "Retro", T - 90 * MIN, T - 30 * MIN),
        ];
        let context = resolve_context(&events, T, &config);
        let suggestion = adjacency_suggestion(Mode::MeetingPrep, &context).unwrap();
        assert_eq!(suggestion.mode, Mode::MeetingSynthesisMin);
        assert_eq!(suggestion.meeting_id, "b");
        assert_eq!(suggestion.message, "Review notes from Retro");
    }

    #[test]
    fn test_adjacency_synthesis_suggests_prep() {
        let config = TimingConfig::default();
        let events = [
            CalendarEvent::new("a", "Planning", T + 20 * MIN, T + 50 * MIN),
            CalendarEvent::new("b", "Retro", T - 90 * MIN, T - 30 * MIN),
        ];
        let context = resolve_context(&events, T, &config);
        let suggestion = adjacency_suggestion(Mode::MeetingSynthesisMin, &context).unwrap();
        assert_eq!(suggestion.mode, Mode::MeetingPrep);
        assert_eq!(suggestion.meeting_id, "a");
    }

    #[test]
    fn test_no_adjacency_otherwise() {
        let context = MeetingContext::empty(T);
        assert!(adjacency_suggestion(Mode::MeetingPrep, &context).is_none());
        assert!(adjacency_suggestion(Mode::MeetingCapture, &context).is_none());
        assert!(adjacency_suggestion(Mode::NeutralIntent, &context).is_none());
    }

    #[test]
    fn test_action_wire_shape() {
        let action = CapsuleAction::switch_to(Mode::MeetingPrep);
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["label"], "Switch to Meeting Prep");
        assert_eq!(json["kind"]["type"], "switch_mode");
        assert_eq!(json["kind"]["mode"], "meeting_prep");
    }
}
