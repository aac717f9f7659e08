//! Mode selection: meeting context -> one winning mode with a confidence.
//!
//! Pure functions. The only notion of time is `context.now`.

use crate::constants::{MS_PER_MINUTE, NO_CONTEXT_REASON, NO_EVENTS_SIGNAL};
use cadence_context::limits::{display_title, MAX_ALTERNATIVES};
use cadence_context::{CalendarEvent, Confidence, MeetingContext, Mode, TimingConfig};
use serde::{Deserialize, Serialize};

/// Why the selector produced its mode. Stable analytics key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionTrigger {
    MeetingInProgress,
    MeetingUpcoming,
    MeetingRecentlyEnded,
    /// Neutral fallback candidate won.
    Default,
    /// No candidate at all. Unreachable while neutral is always injected.
    NoContext,
    /// Mode chosen explicitly by the user.
    UserSelection,
}

impl SelectionTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionTrigger::MeetingInProgress => "meeting_in_progress",
            SelectionTrigger::MeetingUpcoming => "meeting_upcoming",
            SelectionTrigger::MeetingRecentlyEnded => "meeting_recently_ended",
            SelectionTrigger::Default => "default",
            SelectionTrigger::NoContext => "no_context",
            SelectionTrigger::UserSelection => "user_selection",
        }
    }
}

impl std::fmt::Display for SelectionTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a selection. Produced fresh each evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeSelectionResult {
    pub mode: Mode,
    pub confidence: Confidence,
    pub reason: String,
    pub trigger: SelectionTrigger,
}

/// A mode the selector considered, with the reason it applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeCandidate {
    pub mode: Mode,
    pub reason: String,
    pub trigger: SelectionTrigger,
}

/// Select the mode for `context`.
///
/// Highest priority candidate wins. Confidence:
/// - capture with a live meeting is always HIGH
/// - a lone meeting candidate is HIGH
/// - otherwise the priority gap to the strongest competitor decides:
///   two or more is HIGH, one is MEDIUM
/// - anything else (the neutral fallback) is LOW
pub fn select_mode(context: &MeetingContext, config: &TimingConfig) -> ModeSelectionResult {
    let mut candidates = meeting_candidates(context);
    candidates.push(neutral_candidate(config));
    pick_winner(&candidates, context)
}

fn pick_winner(candidates: &[ModeCandidate], context: &MeetingContext) -> ModeSelectionResult {
    let Some(winner) = candidates.iter().max_by_key(|c| c.mode.priority()) else {
        // Dead while neutral is always a candidate. Keeps `no_context` defined.
        return ModeSelectionResult {
            mode: Mode::NeutralIntent,
            confidence: Confidence::Low,
            reason: NO_CONTEXT_REASON.to_string(),
            trigger: SelectionTrigger::NoContext,
        };
    };

    ModeSelectionResult {
        mode: winner.mode,
        confidence: assess_confidence(winner, candidates, context),
        reason: winner.reason.clone(),
        trigger: winner.trigger,
    }
}

fn assess_confidence(
    winner: &ModeCandidate,
    candidates: &[ModeCandidate],
    context: &MeetingContext,
) -> Confidence {
    // A live meeting is never diluted by a competing prep/synthesis signal.
    if winner.mode == Mode::MeetingCapture && context.has_live_meeting() {
        return Confidence::High;
    }

    let strongest_competitor = candidates
        .iter()
        .filter(|c| c.mode != winner.mode && c.mode != Mode::NeutralIntent)
        .map(|c| c.mode.priority())
        .max();

    match strongest_competitor {
        None if winner.mode != Mode::NeutralIntent => Confidence::High,
        Some(competitor) => match winner.mode.priority().saturating_sub(competitor) {
            gap if gap >= 2 => Confidence::High,
            1 => Confidence::Medium,
            _ => Confidence::Low,
        },
        None => Confidence::Low,
    }
}

/// One candidate per populated slot, highest priority first.
fn meeting_candidates(context: &MeetingContext) -> Vec<ModeCandidate> {
    let now = context.now;
    let mut candidates = Vec::with_capacity(3);

    if let Some(meeting) = &context.current_meeting {
        candidates.push(ModeCandidate {
            mode: Mode::MeetingCapture,
            reason: capture_reason(meeting, now),
            trigger: SelectionTrigger::MeetingInProgress,
        });
    }

    if let Some(meeting) = &context.next_meeting {
        candidates.push(ModeCandidate {
            mode: Mode::MeetingPrep,
            reason: format!(
                "{} starts in {}",
                display_title(&meeting.title),
                format_duration(meeting.start_time - now)
            ),
            trigger: SelectionTrigger::MeetingUpcoming,
        });
    }

    if let Some(meeting) = &context.last_meeting {
        candidates.push(ModeCandidate {
            mode: Mode::MeetingSynthesisMin,
            reason: format!(
                "{} ended {} ago",
                display_title(&meeting.title),
                format_duration(now - meeting.end_time)
            ),
            trigger: SelectionTrigger::MeetingRecentlyEnded,
        });
    }

    candidates
}

fn neutral_candidate(config: &TimingConfig) -> ModeCandidate {
    ModeCandidate {
        mode: Mode::NeutralIntent,
        reason: format!(
            "No meeting in progress, none in the next {} min, none ended in the last {} min",
            config.prep_window_minutes, config.synthesis_window_minutes
        ),
        trigger: SelectionTrigger::Default,
    }
}

fn capture_reason(meeting: &CalendarEvent, now: i64) -> String {
    let title = display_title(&meeting.title);
    if now < meeting.start_time {
        format!(
            "{} is starting (in {})",
            title,
            format_duration(meeting.start_time - now)
        )
    } else if now <= meeting.end_time {
        format!(
            "{} in progress, ends in {}",
            title,
            format_duration(meeting.end_time - now)
        )
    } else {
        format!(
            "{} just ended ({} ago)",
            title,
            format_duration(now - meeting.end_time)
        )
    }
}

/// Up to three non-neutral candidates other than `exclude`, by priority.
pub fn alternatives(context: &MeetingContext, exclude: Mode) -> Vec<ModeCandidate> {
    meeting_candidates(context)
        .into_iter()
        .filter(|c| c.mode != exclude)
        .take(MAX_ALTERNATIVES)
        .collect()
}

/// Plain-language conditions under which `mode` would stop being selected.
pub fn would_change_if(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::NeutralIntent => &[
            "A meeting starts within the prep window",
            "A meeting is in progress",
            "A meeting ended within the synthesis window",
        ],
        Mode::MeetingPrep => &[
            "The meeting starts (switches to capture)",
            "The meeting is cancelled or moved outside the prep window",
            "You choose a different view",
        ],
        Mode::MeetingCapture => &[
            "The meeting ends and the grace period passes",
            "You choose a different view",
        ],
        Mode::MeetingSynthesisMin => &[
            "The synthesis window elapses",
            "Another meeting starts or enters the prep window",
            "You mark the review as done",
        ],
        Mode::AgenticWorkSurface => &["You leave the agentic work surface"],
    }
}

/// One line per populated context slot.
pub fn signals_used(context: &MeetingContext) -> Vec<String> {
    let now = context.now;
    let mut signals = Vec::new();

    if let Some(meeting) = &context.current_meeting {
        signals.push(format!(
            "Live meeting: {} ({})",
            display_title(&meeting.title),
            attendee_summary(meeting.attendees.len())
        ));
    }
    if let Some(meeting) = &context.next_meeting {
        signals.push(format!(
            "Next meeting: {} starts in {}",
            display_title(&meeting.title),
            format_duration(meeting.start_time - now)
        ));
    }
    if let Some(meeting) = &context.last_meeting {
        signals.push(format!(
            "Last meeting: {} ended {} ago",
            display_title(&meeting.title),
            format_duration(now - meeting.end_time)
        ));
    }

    if signals.is_empty() {
        signals.push(NO_EVENTS_SIGNAL.to_string());
    }
    signals
}

fn attendee_summary(count: usize) -> String {
    match count {
        0 => "no attendees listed".to_string(),
        1 => "1 attendee".to_string(),
        n => format!("{n} attendees"),
    }
}

/// Format a non-negative duration: "<1 min", "20 min", "2 hr", "1 hr 30 min".
pub fn format_duration(ms: i64) -> String {
    let minutes = ms.max(0) / MS_PER_MINUTE;
    if minutes < 1 {
        return "<1 min".to_string();
    }
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} hr"),
        (h, m) => format!("{h} hr {m} min"),
    }
}
