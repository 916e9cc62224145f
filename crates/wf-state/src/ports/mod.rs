//! Outbound ports of the state store.

pub mod datastore;

pub use datastore::Datastore;
