//! Context-aware mode selection.
//!
//! One evaluation cycle turns calendar events into a mode for the UI:
//!
//! ```text
//! events ─► resolve_context ─► select_mode ─► StabilityGate ─► commit
//!                                   │                            │
//!                                   ▼                            ▼
//!                          explain (capsule)   audit worker (EventBus)
//! ```
//!
//! Everything except [`ModeEngine`] is a pure function of its inputs. The
//! engine owns the stability state and serializes concurrent evaluations.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use cadence_context::{CalendarEvent, ManualClock, Mode, TimingConfig};
//! use cadence_engine::{ModeEngine, Trigger};
//! use cadence_events::NullEventBus;
//!
//! let now = 1_700_000_000_000;
//! let clock = Arc::new(ManualClock::new(now));
//! let engine = ModeEngine::with_clock(TimingConfig::default(), Arc::new(NullEventBus), clock)
//!     .unwrap();
//!
//! let events = vec![CalendarEvent::new("1", "Standup", now - 60_000, now + 900_000)];
//! let outcome = engine.evaluate(&events, Trigger::AppOpen);
//! assert!(outcome.should_switch);
//! assert_eq!(outcome.plan.mode, Mode::MeetingCapture);
//! ```

mod audit;
pub mod constants;
mod error;
mod explainer;
mod orchestrator;
mod plan;
mod selector;
mod stability;

pub use error::{EngineError, Result};
pub use explainer::{
    adjacency_suggestion, explain, ActionKind, AdjacencySuggestion, CapsuleAction, DecisionCapsule,
};
pub use orchestrator::{EditGuard, EvaluationOutcome, ModeEngine};
pub use plan::RenderPlan;
pub use selector::{
    alternatives, format_duration, select_mode, signals_used, would_change_if, ModeCandidate,
    ModeSelectionResult, SelectionTrigger,
};
pub use stability::{
    BlockReason, EditEnd, EditSession, StabilityGate, StabilitySnapshot,
    SwitchDecision, SwitchDenial, Trigger,
};
