//! Audit sink port.
//!
//! The engine's only outbound side effect goes through [`EventBus`]. Hosts
//! plug in their event log; tests capture into [`InMemoryEventBus`].

use std::sync::{Arc, Mutex, MutexGuard};

/// Failure reported by an audit sink.
///
/// The engine logs and swallows these; they never reach the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventBusError {
    /// The sink refused the record (validation, quota).
    #[error("event rejected: {0}")]
    Rejected(String),

    /// The sink could not be reached.
    #[error("event sink unavailable: {0}")]
    Unavailable(String),
}

/// Destination for audit records.
pub trait EventBus: Send + Sync {
    /// Record one audit event.
    ///
    /// `topic` is one of [`crate::event_names`]; `payload` is the serialized
    /// contract for that topic.
    fn emit(&self, topic: &str, payload: serde_json::Value) -> Result<(), EventBusError>;
}

/// Shared handle the engine holds.
pub type EventBusRef = Arc<dyn EventBus>;

/// One record captured by [`InMemoryEventBus`], in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

/// Audit sink that keeps everything in memory. Used by tests and demos.
#[derive(Default)]
pub struct InMemoryEventBus {
    records: Mutex<Vec<EmittedEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking test thread must not hide what was recorded before it.
    fn records(&self) -> MutexGuard<'_, Vec<EmittedEvent>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of every record so far.
    pub fn events(&self) -> Vec<EmittedEvent> {
        self.records().clone()
    }

    /// Records for one topic, oldest first.
    pub fn events_for(&self, topic: &str) -> Vec<EmittedEvent> {
        self.records()
            .iter()
            .filter(|record| record.topic == topic)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.records().clear();
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) -> Result<(), EventBusError> {
        self.records().push(EmittedEvent {
            topic: topic.to_string(),
            payload,
        });
        Ok(())
    }
}

/// Discards every record.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) -> Result<(), EventBusError> {
        Ok(())
    }
}
