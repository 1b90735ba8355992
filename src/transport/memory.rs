use super::{InboundEvent, ListenerRegistry, OutboundEvent, Subscription, Transport};
use crate::errors::{ChatterError, ChatterResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// In-process transport: events are injected by hand and emits are recorded.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    registry: ListenerRegistry,
    sent: Mutex<Vec<OutboundEvent>>,
    fail_sends: AtomicBool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers an inbound event as if the server had sent it.
    pub fn inject(&self, event: InboundEvent) -> usize {
        self.registry.dispatch(event)
    }

    pub fn sent(&self) -> Vec<OutboundEvent> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn listener_count(&self) -> usize {
        self.registry.listener_count()
    }

    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }
}

impl Transport for MemoryTransport {
    fn subscribe(&self) -> Subscription {
        self.registry.subscribe()
    }

    fn emit(&self, event: OutboundEvent) -> ChatterResult<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(ChatterError::transport_error("socket is not writable"));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        Ok(())
    }
}
