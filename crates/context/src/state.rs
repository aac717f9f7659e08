//! Calendar input and resolved meeting context structures.

use serde::{Deserialize, Serialize};

/// A normalized calendar event, as supplied by the calendar collaborator.
///
/// Times are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,

    pub title: String,

    pub start_time: i64,

    pub end_time: i64,

    /// Attendee display names.
    #[serde(default)]
    pub attendees: Vec<String>,
}

impl CalendarEvent {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start_time: i64,
        end_time: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start_time,
            end_time,
            attendees: Vec::new(),
        }
    }

    pub fn with_attendees<I, S>(mut self, attendees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attendees = attendees.into_iter().map(Into::into).collect();
        self
    }
}

/// Three-slot view of the calendar relative to `now`.
///
/// Derived on every evaluation and never stored. Each event occupies at
/// most one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingContext {
    /// Live meeting (grace period included).
    pub current_meeting: Option<CalendarEvent>,

    /// Soonest meeting starting within the prep window.
    pub next_meeting: Option<CalendarEvent>,

    /// Most recently ended meeting within the synthesis window.
    pub last_meeting: Option<CalendarEvent>,

    /// Evaluation instant (epoch ms).
    pub now: i64,
}

impl MeetingContext {
    /// Context with every slot empty.
    pub fn empty(now: i64) -> Self {
        Self {
            current_meeting: None,
            next_meeting: None,
            last_meeting: None,
            now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current_meeting.is_none() && self.next_meeting.is_none() && self.last_meeting.is_none()
    }

    pub fn has_live_meeting(&self) -> bool {
        self.current_meeting.is_some()
    }

    /// Identity of each slot, ignoring `now`.
    pub fn slot_ids(&self) -> SlotIds {
        SlotIds {
            current: self.current_meeting.as_ref().map(|e| e.id.clone()),
            next: self.next_meeting.as_ref().map(|e| e.id.clone()),
            last: self.last_meeting.as_ref().map(|e| e.id.clone()),
        }
    }
}

/// Which event sits in which slot. Two contexts with equal `SlotIds`
/// select the same mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotIds {
    pub current: Option<String>,
    pub next: Option<String>,
    pub last: Option<String>,
}

/// Event emitted by the boundary poller when slot identity changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryChangedEvent {
    /// Slot identity after the change.
    pub slots: SlotIds,

    /// Events observed on this poll, ready to hand to the engine.
    pub events: Vec<CalendarEvent>,

    /// True for the very first poll after start.
    pub is_initial: bool,

    /// Timestamp
    pub timestamp_ms: i64,
}
