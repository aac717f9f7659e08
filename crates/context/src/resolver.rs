//! Context resolution: calendar events -> current / next / last slots.
//!
//! Pure business logic - the only notion of time is the `now` argument.

use crate::state::{CalendarEvent, MeetingContext};
use crate::timing::TimingConfig;

/// Resolve the three-slot meeting context at `now`.
///
/// Slot rules, checked per event in this order (first match wins):
/// 1. **current**: `start - grace <= now <= end + grace`; latest start wins
/// 2. **next**: `now < start <= now + prep`; soonest start wins
/// 3. **last**: `now - synthesis <= end < now`; latest end wins
///
/// Input order does not matter. Empty input yields an empty context.
pub fn resolve_context(events: &[CalendarEvent], now: i64, config: &TimingConfig) -> MeetingContext {
    let grace = config.grace_ms();
    let prep = config.prep_window_ms();
    let synthesis = config.synthesis_window_ms();

    let mut sorted: Vec<&CalendarEvent> = events.iter().collect();
    sorted.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));

    let mut current: Option<&CalendarEvent> = None;
    let mut next: Option<&CalendarEvent> = None;
    let mut last: Option<&CalendarEvent> = None;

    for event in sorted {
        let start_with_grace = event.start_time.saturating_sub(grace);
        let end_with_grace = event.end_time.saturating_add(grace);

        if now >= start_with_grace && now <= end_with_grace {
            // Sorted ascending, so a later live event replaces an earlier one.
            current = Some(event);
            continue;
        }

        if event.start_time > now && event.start_time <= now.saturating_add(prep) {
            if next.map_or(true, |n| event.start_time < n.start_time) {
                next = Some(event);
            }
        } else if event.end_time < now && event.end_time >= now.saturating_sub(synthesis) {
            if last.map_or(true, |l| event.end_time > l.end_time) {
                last = Some(event);
            }
        }
    }

    MeetingContext {
        current_meeting: current.cloned(),
        next_meeting: next.cloned(),
        last_meeting: last.cloned(),
        now,
    }
}

/// Earliest instant strictly after `now` at which any slot predicate can flip.
///
/// Returns `None` when no event can affect the context in the future.
pub fn next_boundary(events: &[CalendarEvent], now: i64, config: &TimingConfig) -> Option<i64> {
    let grace = config.grace_ms();
    let prep = config.prep_window_ms();
    let synthesis = config.synthesis_window_ms();

    events
        .iter()
        .flat_map(|e| {
            [
                e.start_time.saturating_sub(prep),
                e.start_time.saturating_sub(grace),
                // Predicates are inclusive at these edges; the flip happens 1ms later.
                e.end_time.saturating_add(grace).saturating_add(1),
                e.end_time.saturating_add(synthesis).saturating_add(1),
            ]
        })
        .filter(|&t| t > now)
        .min()
}
