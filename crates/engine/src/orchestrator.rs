//! Mode engine - the stateful facade over one evaluation cycle.
//!
//! ```text
//! evaluate(events, trigger)
//!   -> resolve context -> select mode -> plan + capsule + adjacency
//!   -> [gate lock] can_switch -> after_switch [unlock]
//!   -> audit queue: mode_switch (on allow), plan_rendered (always)
//! ```

use crate::audit::AuditDispatcher;
use crate::constants::USER_SELECTION_SIGNAL;
use crate::error::Result;
use crate::explainer::{adjacency_suggestion, explain, AdjacencySuggestion, DecisionCapsule};
use crate::plan::RenderPlan;
use crate::selector::{select_mode, ModeSelectionResult, SelectionTrigger};
use crate::stability::{
    EditEnd, EditSession, StabilityGate, StabilitySnapshot, SwitchDecision, SwitchDenial, Trigger,
};
use cadence_context::{
    resolve_context, CalendarEvent, Clock, Confidence, Mode, SystemClock, TimingConfig,
};
use cadence_events::{event_names, EventBusRef, ModeSwitchEvent, PlanRenderedEvent};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// Everything the UI needs after one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationOutcome {
    pub plan: RenderPlan,
    /// Explains the proposed mode, even when the switch was blocked.
    pub capsule: DecisionCapsule,
    pub should_switch: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub blocked: Option<SwitchDenial>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub adjacency_suggestion: Option<AdjacencySuggestion>,
}

impl EvaluationOutcome {
    pub fn blocked_reason(&self) -> Option<&str> {
        self.blocked.as_ref().map(|b| b.reason.as_str())
    }
}

/// Owns the stability state for one UI session.
///
/// `Send + Sync`: concurrent evaluations are serialized on the gate lock.
/// Audit records are delivered by a background worker owned by the engine.
pub struct ModeEngine {
    config: TimingConfig,
    audit: AuditDispatcher,
    clock: Arc<dyn Clock>,
    gate: Mutex<StabilityGate>,
}

impl ModeEngine {
    /// Create an engine on the system clock.
    pub fn new(config: TimingConfig, bus: EventBusRef) -> Result<Self> {
        Self::with_clock(config, bus, Arc::new(SystemClock))
    }

    /// Create an engine with an injected clock.
    pub fn with_clock(config: TimingConfig, bus: EventBusRef, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            gate: Mutex::new(StabilityGate::new(config.minimum_hold_ms)),
            config,
            audit: AuditDispatcher::spawn(bus),
            clock,
        })
    }

    fn lock_gate(&self) -> MutexGuard<'_, StabilityGate> {
        self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run one evaluation cycle.
    pub fn evaluate(&self, events: &[CalendarEvent], trigger: impl Into<Trigger>) -> EvaluationOutcome {
        let trigger = trigger.into();
        let now = self.clock.now_ms();

        let context = resolve_context(events, now, &self.config);
        let selection = select_mode(&context, &self.config);
        let plan = RenderPlan::new(&selection, now);
        let capsule = explain(&selection, &context);
        let adjacency = adjacency_suggestion(selection.mode, &context);

        let (decision, previous) = {
            let mut gate = self.lock_gate();
            let previous = gate.current_mode();
            let decision = gate.can_switch(selection.mode, &trigger, now);
            if decision.is_allowed() {
                gate.after_switch(selection.mode, plan.id.clone(), now);
            }
            (decision, previous)
        };

        tracing::debug!(
            mode = %selection.mode,
            confidence = %selection.confidence,
            selection_trigger = %selection.trigger,
            trigger = %trigger,
            allowed = decision.is_allowed(),
            "mode evaluated"
        );

        let blocked = match decision {
            SwitchDecision::Allow => {
                tracing::info!(from = ?previous, to = %selection.mode, trigger = %trigger, "mode switched");
                self.publish_switch(previous, &selection, &trigger);
                None
            }
            SwitchDecision::Deny(denial) => {
                tracing::debug!(
                    blocked_by = denial.blocked_by.as_str(),
                    reason = %denial.reason,
                    "switch blocked"
                );
                Some(denial)
            }
        };
        self.publish_rendered(&selection);

        EvaluationOutcome {
            plan,
            capsule,
            should_switch: blocked.is_none(),
            blocked,
            adjacency_suggestion: adjacency,
        }
    }

    /// Switch to `mode` unconditionally. No gate check, not even focus.
    pub fn force_mode(&self, mode: Mode, events: &[CalendarEvent]) -> EvaluationOutcome {
        let now = self.clock.now_ms();
        let context = resolve_context(events, now, &self.config);

        let selection = ModeSelectionResult {
            mode,
            confidence: Confidence::High,
            reason: format!("Switched to {} by user", mode.label()),
            trigger: SelectionTrigger::UserSelection,
        };
        let plan = RenderPlan::new(&selection, now);
        let mut capsule = explain(&selection, &context);
        capsule.signals_used = vec![USER_SELECTION_SIGNAL.to_string()];
        let adjacency = adjacency_suggestion(mode, &context);

        let previous = {
            let mut gate = self.lock_gate();
            let previous = gate.current_mode();
            gate.after_switch(mode, plan.id.clone(), now);
            previous
        };

        tracing::info!(from = ?previous, to = %mode, "mode forced");
        self.publish_switch(previous, &selection, &Trigger::ExplicitUserAction);
        self.publish_rendered(&selection);

        EvaluationOutcome {
            plan,
            capsule,
            should_switch: true,
            blocked: None,
            adjacency_suggestion: adjacency,
        }
    }

    pub fn current_mode(&self) -> Option<Mode> {
        self.lock_gate().current_mode()
    }

    pub fn stability(&self) -> StabilitySnapshot {
        self.lock_gate().snapshot()
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// Block until every audit record emitted so far has reached the sink.
    ///
    /// Returns false when the audit worker is not running.
    pub fn flush_audit(&self) -> bool {
        self.audit.flush()
    }

    /// An editable field gained focus. Automatic switches are held until
    /// the returned session is ended.
    pub fn begin_edit_session(&self) -> EditSession {
        self.lock_gate().begin_edit()
    }

    pub fn end_edit_session(&self, session: EditSession, how: EditEnd) -> bool {
        self.lock_gate().end_edit(session, how)
    }

    /// Scoped edit session that ends with [`EditEnd::Blur`] when dropped.
    pub fn edit_guard(&self) -> EditGuard<'_> {
        EditGuard {
            engine: self,
            session: Some(self.begin_edit_session()),
        }
    }

    fn publish_switch(&self, from: Option<Mode>, selection: &ModeSelectionResult, trigger: &Trigger) {
        let event = ModeSwitchEvent {
            from,
            to: selection.mode,
            trigger: trigger.as_str().to_string(),
            reason: selection.reason.clone(),
            confidence: selection.confidence,
        };
        self.publish(event_names::MODE_SWITCH, &event);
    }

    fn publish_rendered(&self, selection: &ModeSelectionResult) {
        let event = PlanRenderedEvent {
            mode: selection.mode,
            confidence: selection.confidence,
        };
        self.publish(event_names::PLAN_RENDERED, &event);
    }

    /// Best effort. Failures are logged, never returned.
    fn publish<T: Serialize>(&self, topic: &'static str, event: &T) {
        let payload = match serde_json::to_value(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(topic, error = %e, "failed to serialize audit event");
                return;
            }
        };
        self.audit.record(topic, payload);
    }
}

/// Edit session tied to a scope. See [`ModeEngine::edit_guard`].
pub struct EditGuard<'a> {
    engine: &'a ModeEngine,
    session: Option<EditSession>,
}

impl EditGuard<'_> {
    /// End the session with an explicit outcome instead of blur.
    pub fn finish(mut self, how: EditEnd) -> bool {
        match self.session.take() {
            Some(session) => self.engine.end_edit_session(session, how),
            None => false,
        }
    }
}

impl Drop for EditGuard<'_> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.engine.end_edit_session(session, EditEnd::Blur);
        }
    }
}
