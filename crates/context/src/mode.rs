//! Mode definitions and priority vocabulary.
//!
//! Pure domain logic - no I/O, no clock reads.

use serde::{Deserialize, Serialize};

/// The view the application should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// No meeting signal - user sets their own intent.
    #[default]
    NeutralIntent,

    /// A meeting starts within the prep window.
    MeetingPrep,

    /// A meeting is live (grace period included).
    /// Highest priority.
    MeetingCapture,

    /// A meeting ended within the synthesis window.
    MeetingSynthesisMin,

    /// Reserved for the agentic work surface.
    /// Never auto-selected; only reachable through an explicit user choice.
    AgenticWorkSurface,
}

impl Mode {
    /// All modes, highest priority first.
    pub const ALL: [Mode; 5] = [
        Mode::MeetingCapture,
        Mode::MeetingPrep,
        Mode::MeetingSynthesisMin,
        Mode::NeutralIntent,
        Mode::AgenticWorkSurface,
    ];

    /// Fixed selection priority. Distinct per mode, so ties are impossible.
    pub fn priority(&self) -> u8 {
        match self {
            Mode::MeetingCapture => 4,
            Mode::MeetingPrep => 3,
            Mode::MeetingSynthesisMin => 2,
            Mode::NeutralIntent => 1,
            Mode::AgenticWorkSurface => 0,
        }
    }

    /// Returns a human-readable label for the mode.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::NeutralIntent => "Neutral",
            Mode::MeetingPrep => "Meeting Prep",
            Mode::MeetingCapture => "Meeting Capture",
            Mode::MeetingSynthesisMin => "Meeting Synthesis",
            Mode::AgenticWorkSurface => "Agentic Work Surface",
        }
    }

    /// Wire name, as used in audit payloads and analytics keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::NeutralIntent => "neutral_intent",
            Mode::MeetingPrep => "meeting_prep",
            Mode::MeetingCapture => "meeting_capture",
            Mode::MeetingSynthesisMin => "meeting_synthesis_min",
            Mode::AgenticWorkSurface => "agentic_work_surface",
        }
    }

    /// Layout hint used by the renderer's static component table.
    pub fn layout(&self) -> LayoutHint {
        match self {
            Mode::NeutralIntent => LayoutHint::Stack,
            Mode::MeetingPrep => LayoutHint::Split,
            Mode::MeetingCapture => LayoutHint::Single,
            Mode::MeetingSynthesisMin => LayoutHint::Stack,
            Mode::AgenticWorkSurface => LayoutHint::Stack,
        }
    }

}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Layout hint attached to a render plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutHint {
    Stack,
    Split,
    Single,
}

/// Calibrated confidence of a mode selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
            Confidence::Low => "LOW",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
