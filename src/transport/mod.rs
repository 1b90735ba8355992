//! Event transport between the chat panel and the bot server.
//!
//! A [`Transport`] hands out [`Subscription`]s for inbound events and accepts
//! outbound events. Subscriptions deregister themselves when dropped, so a
//! view that unmounts stops receiving events without any explicit teardown.

pub mod memory;
pub mod packet;
pub mod socket;

use crate::constants::{EVENT_BOT_MESSAGE, EVENT_BOT_TYPING, EVENT_USER_MESSAGE};
use crate::errors::ChatterResult;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    BotTyping,
    BotMessage(String),
    ConnectError(String),
    Disconnect(String),
}

impl InboundEvent {
    /// Maps a server-emitted event onto the events the panel understands.
    pub fn from_event(name: &str, args: &[Value]) -> Option<Self> {
        match name {
            EVENT_BOT_TYPING => Some(InboundEvent::BotTyping),
            EVENT_BOT_MESSAGE => Some(InboundEvent::BotMessage(
                args.first().map(value_text).unwrap_or_default(),
            )),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    UserMessage(String),
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::UserMessage(_) => EVENT_USER_MESSAGE,
        }
    }

    pub fn args(&self) -> Vec<Value> {
        match self {
            OutboundEvent::UserMessage(text) => vec![Value::String(text.clone())],
        }
    }
}

/// Plain strings pass through; anything else is rendered as JSON.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("message") {
            Some(Value::String(s)) => s.clone(),
            _ => value.to_string(),
        },
        other => other.to_string(),
    }
}

pub trait Transport: Send + Sync {
    /// Registers a listener for every inbound event kind.
    fn subscribe(&self) -> Subscription;

    /// Queues an event for the server without waiting for delivery.
    fn emit(&self, event: OutboundEvent) -> ChatterResult<()>;
}

#[derive(Debug, Default)]
struct Listeners {
    next_id: u64,
    senders: HashMap<u64, mpsc::UnboundedSender<InboundEvent>>,
}

/// Fan-out of inbound events to every live subscription.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<Mutex<Listeners>>,
}

fn lock(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    listeners.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ListenerRegistry {
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut listeners = lock(&self.inner);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.senders.insert(id, tx);

        Subscription {
            id,
            rx,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Delivers `event` to every listener and returns how many received it.
    pub fn dispatch(&self, event: InboundEvent) -> usize {
        let mut listeners = lock(&self.inner);
        listeners
            .senders
            .retain(|_, tx| tx.send(event.clone()).is_ok());
        listeners.senders.len()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.inner).senders.len()
    }
}

/// A live listener registration. Dropping it deregisters the listener.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<InboundEvent>,
    registry: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<InboundEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<InboundEvent> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            lock(&inner).senders.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dispatch_reaches_every_subscription() {
        let registry = ListenerRegistry::default();
        let mut a = registry.subscribe();
        let mut b = registry.subscribe();

        assert_eq!(registry.dispatch(InboundEvent::BotTyping), 2);
        assert_eq!(a.try_recv(), Some(InboundEvent::BotTyping));
        assert_eq!(b.try_recv(), Some(InboundEvent::BotTyping));
    }

    #[test]
    fn dropped_subscription_is_deregistered() {
        let registry = ListenerRegistry::default();
        let sub = registry.subscribe();
        assert_eq!(registry.listener_count(), 1);

        drop(sub);

        assert_eq!(registry.listener_count(), 0);
        assert_eq!(registry.dispatch(InboundEvent::BotMessage("late".into())), 0);
    }

    #[test]
    fn maps_server_events() {
        assert_eq!(
            InboundEvent::from_event("bot-message", &[json!("hi there")]),
            Some(InboundEvent::BotMessage("hi there".to_string()))
        );
        assert_eq!(
            InboundEvent::from_event("bot-typing", &[]),
            Some(InboundEvent::BotTyping)
        );
        assert_eq!(InboundEvent::from_event("user-joined", &[]), None);
    }

    #[test]
    fn value_text_prefers_message_field() {
        assert_eq!(value_text(&json!({ "message": "refused" })), "refused");
        assert_eq!(value_text(&json!(42)), "42");
    }
}
