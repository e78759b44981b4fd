//! Event forwarder: one wire message per host combat callback
//!
//! Events go out immediately, in callback order, one call each. A failed
//! delivery is logged and counted; it is not retried and does not affect
//! later events.

use crate::bridge::service::DecisionService;
use crate::host::CombatEvent;
use crate::protocol::messages::WireEvent;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EventForwarder {
    forwarded: u64,
    failed: u64,
}

impl EventForwarder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send one event. Returns whether the service acknowledged it.
    pub fn forward(&mut self, service: &mut dyn DecisionService, event: &CombatEvent) -> bool {
        let wire = WireEvent::from(event);
        let kind = wire.kind();
        match service.on_event(wire) {
            Ok(()) => {
                self.forwarded += 1;
                tracing::debug!(event = kind, "Event forwarded");
                true
            }
            Err(e) => {
                self.failed += 1;
                tracing::warn!(event = kind, error = %e, "Event not delivered");
                false
            }
        }
    }

    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }
}
