//! Provider traits for calendar input and time.
//!
//! These traits abstract the calendar collaborator and the wall clock,
//! allowing the domain logic to remain pure and testable.

use crate::state::CalendarEvent;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of already-normalized calendar events.
pub trait CalendarProvider: Send + Sync {
    /// Events around the present; the resolver discards anything out of window.
    fn upcoming_events(&self) -> Vec<CalendarEvent>;
}

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to.
///
/// Used by tests and by hosts that drive time themselves.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Null implementation for testing or hosts without a calendar.
pub struct NullProvider;

impl CalendarProvider for NullProvider {
    fn upcoming_events(&self) -> Vec<CalendarEvent> {
        Vec::new()
    }
}

/// Provider over a fixed list of events.
#[derive(Debug, Default, Clone)]
pub struct StaticProvider {
    events: Vec<CalendarEvent>,
}

impl StaticProvider {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self { events }
    }
}

impl CalendarProvider for StaticProvider {
    fn upcoming_events(&self) -> Vec<CalendarEvent> {
        self.events.clone()
    }
}
