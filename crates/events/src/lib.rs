//! Shared audit event contracts.
//!
//! This crate defines the formal contracts (DTOs) for the two events the
//! mode engine records. Analytics outside the engine key off these field
//! names, so they are pinned here rather than built ad hoc.
//!
//! Also provides the `EventBus` trait for decoupled event emission.

mod bus;

pub use bus::{EmittedEvent, EventBus, EventBusError, EventBusRef, InMemoryEventBus, NullEventBus};

use cadence_context::{Confidence, Mode};
use serde::{Deserialize, Serialize};

/// Recorded when the displayed mode actually changes.
///
/// Producers: mode engine (evaluate, force_mode)
/// Consumers: host event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSwitchEvent {
    /// Mode before the switch; `None` on the first evaluation of a session.
    pub from: Option<Mode>,
    /// Mode after the switch.
    pub to: Mode,
    /// Evaluation trigger that caused the switch.
    pub trigger: String,
    /// Human-readable selection reason.
    pub reason: String,
    pub confidence: Confidence,
}

/// Recorded on every evaluation, switched or not.
///
/// Denominator for override-rate analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRenderedEvent {
    pub mode: Mode,
    pub confidence: Confidence,
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// Mode switch record.
    pub const MODE_SWITCH: &str = "mode_switch";
    /// Plan rendered record.
    pub const PLAN_RENDERED: &str = "plan_rendered";
}
