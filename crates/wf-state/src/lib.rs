//! # wf-state
//!
//! The protocol state store: authoritative custody of all durable gateway
//! state with at-rest envelope encryption.
//!
//! ## Role in System
//!
//! - **Single Source of Truth**: blockchain parameters, originator records,
//!   work queues and the multi-category keystore
//! - **Envelope encryption**: the whole state blob under a derived data
//!   encryption key, each stored key under its own key encryption key
//! - **Choreography participant**: every mutation emits a typed
//!   [`StateEvent`] and writes through the [`Datastore`] port
//!
//! ## Ownership
//!
//! The [`StateStore`] exclusively owns the in-memory state behind one
//! exclusive mutex. Other subsystems receive copies and request mutations
//! through the named operations; no lock is ever held across a suspension
//! point. Cryptographic secrets live inside the keystore and leave a
//! `get_key` scope only as zeroising buffers.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod events;
pub mod ports;
pub mod service;

pub use adapters::{FileDatastore, InMemoryDatastore};
pub use config::StateConfig;
pub use domain::entities::{
    Account, BlockDepthEntry, ChainState, ChainStatus, EncryptedKey, InitVectorEntry, KeyBucket,
    KeyRecord, KeyVault, Originator, QueueName, Queues, State,
};
pub use domain::envelope::{MasterKey, StateBlob};
pub use domain::originators::OriginatorUpdate;
pub use domain::errors::StateError;
pub use events::StateEvent;
pub use ports::Datastore;
pub use service::StateStore;
