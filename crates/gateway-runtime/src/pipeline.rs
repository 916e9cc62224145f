//! Stream bridges between subsystem stages.
//!
//! The full rx pipeline (decryption, duplicate filtering, datastore
//! write) is a collaborator of this workspace; the listener already
//! delivers decoded messages, so the bridge promotes them to processed.
//! Likewise the tx transmit step sits between committed and processed;
//! without a transmitter the bridge promotes committed messages directly.

use tokio::task::JoinHandle;
use tracing::debug;
use wf_bus::{Buses, EventFilter, MessageEventKind};

/// Spawn the two pass-through bridges.
///
/// Subscriptions are taken before the tasks start, so no event emitted
/// after this call returns is missed.
#[must_use]
pub fn spawn_bridges(buses: &Buses) -> Vec<JoinHandle<()>> {
    let mut rx_subscription = buses
        .rx
        .subscribe(EventFilter::kinds(vec![MessageEventKind::MessageReceived]));
    let rx_buses = buses.clone();
    let rx_bridge = tokio::spawn(async move {
        while let Ok(event) = rx_subscription.recv().await {
            debug!(
                transaction = event.message.meta_header.transaction_hash.as_str(),
                "rx message processed"
            );
            rx_buses
                .rx
                .emit(MessageEventKind::MessageProcessed, event.message);
        }
    });

    let mut tx_subscription = buses
        .tx
        .subscribe(EventFilter::kinds(vec![MessageEventKind::MessageCommitted]));
    let tx_buses = buses.clone();
    let tx_bridge = tokio::spawn(async move {
        while let Ok(event) = tx_subscription.recv().await {
            debug!(
                referenced = event.message.message_header.referenced_message.as_str(),
                "tx message processed"
            );
            tx_buses
                .tx
                .emit(MessageEventKind::MessageProcessed, event.message);
        }
    });

    vec![rx_bridge, tx_bridge]
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_protocol::WfMessage;

    #[tokio::test]
    async fn test_rx_bridge_promotes_received() {
        let buses = Buses::new();
        let mut processed = buses
            .rx
            .subscribe(EventFilter::kinds(vec![MessageEventKind::MessageProcessed]));
        let _bridges = spawn_bridges(&buses);

        buses
            .rx
            .emit(MessageEventKind::MessageReceived, WfMessage::default());
        let event = processed.recv().await.unwrap();
        assert_eq!(event.kind, MessageEventKind::MessageProcessed);
    }

    #[tokio::test]
    async fn test_tx_bridge_promotes_committed() {
        let buses = Buses::new();
        let mut processed = buses
            .tx
            .subscribe(EventFilter::kinds(vec![MessageEventKind::MessageProcessed]));
        let _bridges = spawn_bridges(&buses);

        buses
            .tx
            .emit(MessageEventKind::MessageCommitted, WfMessage::default());
        let event = processed.recv().await.unwrap();
        assert_eq!(event.kind, MessageEventKind::MessageProcessed);
    }
}
