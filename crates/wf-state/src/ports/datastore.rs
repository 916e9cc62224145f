//! Datastore abstraction.
//!
//! The blob is opaque to the datastore; the driver behind this port (file,
//! document store, embedded database) is a collaborator outside this crate.

use async_trait::async_trait;

use crate::domain::envelope::StateBlob;
use crate::domain::errors::StateError;

/// Persistent custody of the enveloped state blob.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Read the stored blob, or `None` when no state was ever persisted.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Datastore` when the backend cannot be read.
    async fn get_state(&self) -> Result<Option<StateBlob>, StateError>;

    /// Persist the blob, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Datastore` when the backend cannot be written.
    async fn store_state(&self, blob: &StateBlob) -> Result<(), StateError>;
}
