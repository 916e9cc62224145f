//! The stream implementation.
//!
//! Backed by `tokio::sync::broadcast` for multi-consumer delivery with
//! per-subscriber buffering. Emission order is delivery order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use wf_protocol::WfMessage;

use crate::events::{EventFilter, MessageEvent, MessageEventKind};
use crate::DEFAULT_CHANNEL_CAPACITY;

/// Subscription-side failures.
#[derive(Debug, Clone, Error)]
pub enum SubscriptionError {
    /// The stream was dropped; no more events will arrive.
    #[error("event stream closed")]
    Closed,
}

/// One ordered event stream.
pub struct MessageBus {
    /// Stream name, for log context (`rx` / `tx`).
    name: &'static str,

    /// Broadcast sender for events.
    sender: broadcast::Sender<MessageEvent>,

    /// Total events emitted.
    events_emitted: AtomicU64,
}

impl MessageBus {
    /// Create a stream with default capacity.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self::with_capacity(name, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a stream with the given per-subscriber capacity.
    #[must_use]
    pub fn with_capacity(name: &'static str, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            name,
            sender,
            events_emitted: AtomicU64::new(0),
        }
    }

    /// Stream name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Emit an event; returns the number of subscribers that received it.
    pub fn emit(&self, kind: MessageEventKind, message: WfMessage) -> usize {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
        let event = MessageEvent::new(kind, message);

        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(
                    stream = self.name,
                    kind = ?kind,
                    receivers = receiver_count,
                    "event emitted"
                );
                receiver_count
            }
            Err(_) => {
                warn!(stream = self.name, kind = ?kind, "event dropped (no subscribers)");
                0
            }
        }
    }

    /// Subscribe to events matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(stream = self.name, kinds = ?filter.kinds, "new subscription");
        Subscription {
            stream: self.name,
            receiver: self.sender.subscribe(),
            filter,
        }
    }

    /// Number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Total events emitted since creation.
    #[must_use]
    pub fn events_emitted(&self) -> u64 {
        self.events_emitted.load(Ordering::Relaxed)
    }
}

/// A filtered handle on one stream.
pub struct Subscription {
    stream: &'static str,
    receiver: broadcast::Receiver<MessageEvent>,
    filter: EventFilter,
}

impl Subscription {
    /// Receive the next matching event.
    ///
    /// Skips non-matching events. A lagged subscriber drops the missed
    /// events with a warning and keeps receiving.
    ///
    /// # Errors
    ///
    /// Returns `SubscriptionError::Closed` when the stream is gone.
    pub async fn recv(&mut self) -> Result<MessageEvent, SubscriptionError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Ok(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(stream = self.stream, missed, "subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
            }
        }
    }
}

/// The two gateway streams.
#[derive(Clone)]
pub struct Buses {
    /// Inbound chain messages.
    pub rx: Arc<MessageBus>,
    /// Outbound messages.
    pub tx: Arc<MessageBus>,
}

impl Buses {
    /// Create both streams with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rx: Arc::new(MessageBus::new("rx")),
            tx: Arc::new(MessageBus::new("tx")),
        }
    }
}

impl Default for Buses {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_no_subscribers() {
        let bus = MessageBus::new("rx");
        let receivers = bus.emit(MessageEventKind::MessageReceived, WfMessage::default());
        assert_eq!(receivers, 0);
        assert_eq!(bus.events_emitted(), 1);
    }

    #[tokio::test]
    async fn test_emission_order_preserved() {
        let bus = MessageBus::new("rx");
        let mut sub = bus.subscribe(EventFilter::all());

        for reference in ['0', '1', '2'] {
            let mut message = WfMessage::default();
            message.message_header.reference_indicator = reference;
            bus.emit(MessageEventKind::MessageReceived, message);
        }

        for expected in ['0', '1', '2'] {
            let event = sub.recv().await.unwrap();
            assert_eq!(event.message.message_header.reference_indicator, expected);
        }
    }

    #[tokio::test]
    async fn test_filtered_subscription() {
        let bus = MessageBus::new("tx");
        let mut sub =
            bus.subscribe(EventFilter::kinds(vec![MessageEventKind::MessageProcessed]));

        bus.emit(MessageEventKind::MessageReceived, WfMessage::default());
        bus.emit(MessageEventKind::MessageProcessed, WfMessage::default());

        let event = sub.recv().await.unwrap();
        assert_eq!(event.kind, MessageEventKind::MessageProcessed);
    }

    #[tokio::test]
    async fn test_closed_stream() {
        let bus = MessageBus::new("rx");
        let mut sub = bus.subscribe(EventFilter::all());
        drop(bus);
        assert!(matches!(sub.recv().await, Err(SubscriptionError::Closed)));
    }

    #[test]
    fn test_buses_distinct() {
        let buses = Buses::new();
        assert_eq!(buses.rx.name(), "rx");
        assert_eq!(buses.tx.name(), "tx");
    }
}
