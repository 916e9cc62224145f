//! In-memory datastore for tests and ephemeral deployments.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::envelope::StateBlob;
use crate::domain::errors::StateError;
use crate::ports::Datastore;

/// Datastore holding the blob in memory only.
#[derive(Default)]
pub struct InMemoryDatastore {
    blob: Mutex<Option<StateBlob>>,
}

impl InMemoryDatastore {
    /// Create an empty datastore.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a blob has been stored; test helper.
    #[must_use]
    pub fn stored(&self) -> bool {
        self.blob.lock().is_some()
    }
}

#[async_trait]
impl Datastore for InMemoryDatastore {
    async fn get_state(&self) -> Result<Option<StateBlob>, StateError> {
        Ok(self.blob.lock().clone())
    }

    async fn store_state(&self, blob: &StateBlob) -> Result<(), StateError> {
        *self.blob.lock() = Some(blob.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip() {
        let store = InMemoryDatastore::new();
        assert!(store.get_state().await.unwrap().is_none());

        let blob = StateBlob {
            state: "{}".to_string(),
            ..StateBlob::default()
        };
        store.store_state(&blob).await.unwrap();
        assert!(store.stored());
        assert_eq!(store.get_state().await.unwrap().unwrap(), blob);
    }
}
