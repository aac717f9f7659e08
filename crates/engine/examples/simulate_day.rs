//! Example: Drive the mode engine from the boundary poller over a fake day.
//!
//! Run with: cargo run -p cadence-engine --example simulate_day

use cadence_context::{
    BoundaryChangedEvent, BoundaryPoller, CalendarEvent, ManualClock, StaticProvider, TimingConfig,
};
use cadence_engine::{ModeEngine, Trigger};
use cadence_events::InMemoryEventBus;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const MIN: i64 = 60_000;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,cadence_engine=debug")),
        )
        .init();

    let start = chrono::Utc::now().timestamp_millis();
    let clock = Arc::new(ManualClock::new(start));
    let provider = Arc::new(StaticProvider::new(vec![
        CalendarEvent::new("standup", "Daily standup", start + 30 * MIN, start + 45 * MIN)
            .with_attendees(["ana", "bo", "cy"]),
        CalendarEvent::new("review", "Design review", start + 120 * MIN, start + 180 * MIN),
    ]));

    let bus = Arc::new(InMemoryEventBus::new());
    let engine = Arc::new(
        ModeEngine::with_clock(TimingConfig::default(), bus.clone(), clock.clone())
            .expect("default config is valid"),
    );

    let mut poller = BoundaryPoller::new();
    let engine_for_poller = Arc::clone(&engine);
    poller.start_with_interval(
        provider,
        clock.clone(),
        TimingConfig::default(),
        Arc::new(move |event: BoundaryChangedEvent| {
            let trigger = if event.is_initial {
                Trigger::AppOpen
            } else {
                Trigger::MeetingBoundaryChange
            };
            let outcome = engine_for_poller.evaluate(&event.events, trigger);
            println!(
                "[+{:>3} min] {:<20} {:<6} switched={:<5} {}",
                (event.timestamp_ms - start) / MIN,
                outcome.capsule.view_label,
                outcome.plan.confidence.as_str(),
                outcome.should_switch,
                outcome.capsule.reason,
            );
        }),
        Duration::from_millis(20),
    );

    // Fast-forward five hours, one simulated minute every 25ms.
    for _ in 0..300 {
        std::thread::sleep(Duration::from_millis(25));
        clock.advance(MIN);
    }
    poller.stop();

    println!("\n{} audit events recorded", bus.len());
}
