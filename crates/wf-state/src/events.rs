//! Typed events emitted by the state store.
//!
//! Every mutation emits exactly one primary event (plus secondary events
//! for composite operations like the originator upsert). Payloads carry
//! identifiers only, never secrets.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{KeyBucket, QueueName};

/// Observable state mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateEvent {
    /// A chain's parameters, status or accounts changed.
    UpdatedBlockchain {
        /// The chain that changed.
        blockchain: String,
    },

    /// A new originator record was inserted.
    InsertedOriginator {
        /// Address of the record, possibly empty for token-only records.
        address: String,
    },

    /// An existing originator record was updated.
    UpdatedOriginator {
        /// Address of the record.
        address: String,
    },

    /// An originator record was removed.
    RemovedOriginator {
        /// Address of the removed record, possibly empty.
        address: String,
    },

    /// A token-bound originator record was inserted.
    InsertedOriginatorAuthToken {
        /// The token identifier.
        auth_token_id: String,
    },

    /// A token-bound originator record was updated.
    UpdatedOriginatorAuthToken {
        /// The token identifier.
        auth_token_id: String,
    },

    /// An item was appended to a queue.
    InsertedInQueue {
        /// The queue.
        queue: QueueName,
    },

    /// An existing queue item was replaced.
    UpdatedQueue {
        /// The queue.
        queue: QueueName,
    },

    /// An item was removed from a queue.
    RemovedFromQueue {
        /// The queue.
        queue: QueueName,
    },

    /// A key was inserted into a keystore bucket.
    InsertedKey {
        /// The bucket.
        bucket: KeyBucket,
        /// The key identifier.
        id: String,
    },

    /// An existing key was replaced.
    UpdatedKey {
        /// The bucket.
        bucket: KeyBucket,
        /// The key identifier.
        id: String,
    },

    /// A key was removed from a keystore bucket.
    RemovedKey {
        /// The bucket.
        bucket: KeyBucket,
        /// The key identifier.
        id: String,
    },

    /// The state was persisted through the datastore.
    Saved,

    /// The store flushed and cleared its master key.
    Closed,
}
