//! Background audit dispatch.
//!
//! Records are queued on an unbounded channel and drained into the sink by
//! one worker thread, in emission order. The evaluating thread only pays for
//! the enqueue; a slow, failing or panicking sink is logged and skipped.

use cadence_events::EventBusRef;
use crossbeam_channel::{Receiver, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::JoinHandle;

enum Command {
    Record {
        topic: &'static str,
        payload: serde_json::Value,
    },
    Flush(Sender<()>),
}

pub(crate) struct AuditDispatcher {
    sender: Option<Sender<Command>>,
    handle: Option<JoinHandle<()>>,
}

impl AuditDispatcher {
    pub(crate) fn spawn(bus: EventBusRef) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded::<Command>();
        let spawned = std::thread::Builder::new()
            .name("cadence-audit".to_string())
            .spawn(move || drain(bus, rx));

        match spawned {
            Ok(handle) => Self {
                sender: Some(tx),
                handle: Some(handle),
            },
            Err(e) => {
                tracing::warn!(error = %e, "audit worker failed to start, audit disabled");
                Self {
                    sender: None,
                    handle: None,
                }
            }
        }
    }

    pub(crate) fn record(&self, topic: &'static str, payload: serde_json::Value) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(Command::Record { topic, payload }).is_err() {
            tracing::warn!(topic, "audit worker gone, dropping record");
        }
    }

    /// Block until every record queued before this call reached the sink.
    pub(crate) fn flush(&self) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        if sender.send(Command::Flush(ack_tx)).is_err() {
            return false;
        }
        ack_rx.recv().is_ok()
    }
}

impl Drop for AuditDispatcher {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish the backlog and exit.
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn drain(bus: EventBusRef, rx: Receiver<Command>) {
    for command in rx {
        match command {
            Command::Record { topic, payload } => {
                match catch_unwind(AssertUnwindSafe(|| bus.emit(topic, payload))) {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::warn!(topic, error = %e, "failed to emit audit event"),
                    Err(_) => tracing::warn!(topic, "audit sink panicked"),
                }
            }
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    tracing::debug!("audit worker stopped");
}
