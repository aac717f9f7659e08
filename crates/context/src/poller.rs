//! Boundary poller - background task that watches for meeting boundaries.
//!
//! Emits a [`BoundaryChangedEvent`] whenever the identity of the current,
//! next or last meeting changes. Hosts wire this to a
//! `meeting_boundary_change` evaluation.

use crate::provider::{CalendarProvider, Clock};
use crate::resolver::{next_boundary, resolve_context};
use crate::state::{BoundaryChangedEvent, SlotIds};
use crate::timing::TimingConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default polling interval for calendar boundaries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Floor for boundary-driven early wakeups.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Callback type for boundary change events.
pub type BoundaryCallback = Arc<dyn Fn(BoundaryChangedEvent) + Send + Sync + 'static>;

/// Background poller for meeting boundary changes.
pub struct BoundaryPoller {
    running: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl Default for BoundaryPoller {
    fn default() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }
}

impl BoundaryPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start polling with the given provider, clock and callback.
    pub fn start<P>(
        &mut self,
        provider: Arc<P>,
        clock: Arc<dyn Clock>,
        config: TimingConfig,
        callback: BoundaryCallback,
    ) where
        P: CalendarProvider + 'static,
    {
        self.start_with_interval(provider, clock, config, callback, DEFAULT_POLL_INTERVAL);
    }

    /// Start polling with a custom interval.
    ///
    /// The poller wakes early when the next boundary is closer than
    /// `interval`, but never more often than [`MIN_POLL_INTERVAL`] for
    /// boundary-driven wakeups.
    pub fn start_with_interval<P>(
        &mut self,
        provider: Arc<P>,
        clock: Arc<dyn Clock>,
        config: TimingConfig,
        callback: BoundaryCallback,
        interval: Duration,
    ) where
        P: CalendarProvider + 'static,
    {
        if self.running.load(Ordering::SeqCst) {
            tracing::warn!("BoundaryPoller already running");
            return;
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);

        let handle = std::thread::spawn(move || {
            tracing::info!("BoundaryPoller started with interval {:?}", interval);

            let mut last_slots: Option<SlotIds> = None;

            while running.load(Ordering::SeqCst) {
                let events = provider.upcoming_events();
                let now = clock.now_ms();
                let context = resolve_context(&events, now, &config);
                let slots = context.slot_ids();

                // Only emit if slot identity changed
                let is_initial = last_slots.is_none();
                let should_emit = last_slots.as_ref() != Some(&slots);

                let sleep_for = match next_boundary(&events, now, &config) {
                    Some(at) => {
                        let until_ms = u64::try_from(at.saturating_sub(now)).unwrap_or(0);
                        let until = Duration::from_millis(until_ms);
                        interval.min(until.max(MIN_POLL_INTERVAL))
                    }
                    None => interval,
                };

                if should_emit {
                    tracing::debug!(
                        current = ?slots.current,
                        next = ?slots.next,
                        last = ?slots.last,
                        is_initial,
                        "meeting boundary changed"
                    );
                    last_slots = Some(slots.clone());
                    callback(BoundaryChangedEvent {
                        slots,
                        events,
                        is_initial,
                        timestamp_ms: now,
                    });
                }

                sleep_while_running(&running, sleep_for);
            }

            tracing::info!("BoundaryPoller stopped");
        });

        self.handle = Some(handle);
    }

    /// Stop the poller.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Check if the poller is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for BoundaryPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Sleep in short slices so `stop()` does not wait out a long interval.
fn sleep_while_running(running: &AtomicBool, total: Duration) {
    let slice = Duration::from_millis(50);
    let mut remaining = total;
    while !remaining.is_zero() && running.load(Ordering::SeqCst) {
        let step = remaining.min(slice);
        std::thread::sleep(step);
        remaining = remaining.saturating_sub(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ManualClock, NullProvider, StaticProvider};
    use crate::state::CalendarEvent;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    const MIN: i64 = 60_000;
    const T: i64 = 1_700_000_000_000;

    fn wait_for_len<E>(seen: &Mutex<Vec<E>>, len: usize, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        while std::time::Instant::now() < deadline {
            if seen.lock().unwrap().len() >= len {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        seen.lock().unwrap().len() >= len
    }

    #[test]
    fn test_poller_lifecycle() {
        let mut poller = BoundaryPoller::new();
        assert!(!poller.is_running());

        let provider = Arc::new(NullProvider);
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(T));
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = Arc::clone(&call_count);

        let callback: BoundaryCallback = Arc::new(move |_event| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        poller.start_with_interval(
            provider,
            clock,
            TimingConfig::default(),
            callback,
            Duration::from_millis(20),
        );
        assert!(poller.is_running());

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while call_count.load(Ordering::SeqCst) == 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        // A few more polls over an unchanged calendar
        std::thread::sleep(Duration::from_millis(100));

        poller.stop();
        assert!(!poller.is_running());

        // Nothing changes with an empty calendar: exactly the initial emission
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_poller_emits_on_boundary_crossing() {
        let mut poller = BoundaryPoller::new();
        let provider = Arc::new(StaticProvider::new(vec![CalendarEvent::new(
            "standup",
            "Standup",
            T + 60 * MIN,
            T + 75 * MIN,
        )]));
        let clock = Arc::new(ManualClock::new(T));
        let seen: Arc<Mutex<Vec<BoundaryChangedEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        poller.start_with_interval(
            provider,
            clock.clone(),
            TimingConfig::default(),
            Arc::new(move |event| seen_clone.lock().unwrap().push(event)),
            Duration::from_millis(20),
        );

        assert!(wait_for_len(&seen, 1, Duration::from_secs(5)));
        clock.set(T + 20 * MIN);
        assert!(wait_for_len(&seen, 2, Duration::from_secs(5)));
        poller.stop();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].is_initial);
        assert_eq!(seen[0].slots, SlotIds::default());
        assert!(!seen[1].is_initial);
        assert_eq!(seen[1].slots.next.as_deref(), Some("standup"));
        assert_eq!(seen[1].events.len(), 1);
    }

    #[test]
    fn test_double_start_is_ignored() {
        let mut poller = BoundaryPoller::new();
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(T));
        let callback: BoundaryCallback = Arc::new(|_| {});
        poller.start_with_interval(
            Arc::new(NullProvider),
            Arc::clone(&clock),
            TimingConfig::default(),
            Arc::clone(&callback),
            Duration::from_millis(20),
        );
        poller.start_with_interval(
            Arc::new(NullProvider),
            clock,
            TimingConfig::default(),
            callback,
            Duration::from_millis(20),
        );
        assert!(poller.is_running());
        poller.stop();
        assert!(!poller.is_running());
    }
}
