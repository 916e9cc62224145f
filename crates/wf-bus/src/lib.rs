//! # wf-bus
//!
//! Typed event streams for inter-subsystem message flow.
//!
//! ## Streams
//!
//! Two ordered streams carry every Whiteflag message through the gateway:
//!
//! ```text
//! [Listener] ──MessageReceived──→ [rx] ──MessageProcessed──→ [Management]
//!                                  ↑                              │
//!                                  └───────MessageUpdated─────────┘
//!
//! [Management] ──MessageCommitted──→ [tx] ──MessageProcessed──→ (transmit)
//! ```
//!
//! Events on one stream are delivered in emission order; a handler may
//! re-emit to the other stream. Handlers must not block indefinitely, as
//! there is no cancellation.

pub mod bus;
pub mod events;

pub use bus::{Buses, MessageBus, Subscription, SubscriptionError};
pub use events::{EventFilter, MessageEvent, MessageEventKind};

/// Maximum events buffered per subscriber before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
    }
}
