//! Event types flowing over the rx and tx streams.

use serde::{Deserialize, Serialize};
use wf_protocol::WfMessage;

/// Lifecycle stage of a message on a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageEventKind {
    /// A message was extracted from a block (rx) or accepted for
    /// transmission (tx).
    MessageReceived,

    /// The message passed the codec/decryption pipeline and is ready for
    /// the management plane.
    MessageProcessed,

    /// State attached to the message changed after processing, e.g. the
    /// originator's authentication status.
    MessageUpdated,

    /// An outbound message was committed to a blockchain.
    MessageCommitted,
}

/// One event on a stream: a message at a lifecycle stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Lifecycle stage.
    pub kind: MessageEventKind,
    /// The message payload.
    pub message: WfMessage,
}

impl MessageEvent {
    /// Build an event.
    #[must_use]
    pub fn new(kind: MessageEventKind, message: WfMessage) -> Self {
        Self { kind, message }
    }
}

/// Filter for subscribing to specific event kinds.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Kinds to include. Empty means all kinds.
    pub kinds: Vec<MessageEventKind>,
}

impl EventFilter {
    /// Accept all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Accept only the listed kinds.
    #[must_use]
    pub fn kinds(kinds: Vec<MessageEventKind>) -> Self {
        Self { kinds }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &MessageEvent) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&event.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_all() {
        let filter = EventFilter::all();
        let event = MessageEvent::new(MessageEventKind::MessageReceived, WfMessage::default());
        assert!(filter.matches(&event));
    }

    #[test]
    fn test_filter_by_kind() {
        let filter = EventFilter::kinds(vec![MessageEventKind::MessageProcessed]);

        let processed =
            MessageEvent::new(MessageEventKind::MessageProcessed, WfMessage::default());
        assert!(filter.matches(&processed));

        let received =
            MessageEvent::new(MessageEventKind::MessageReceived, WfMessage::default());
        assert!(!filter.matches(&received));
    }
}
