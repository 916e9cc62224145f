//! File-backed datastore.
//!
//! Persists the blob as JSON on disk, written atomically through a
//! temporary file so a crash mid-write never leaves a torn state file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::envelope::StateBlob;
use crate::domain::errors::StateError;
use crate::ports::Datastore;

/// Datastore persisting the blob to a single JSON file.
pub struct FileDatastore {
    path: PathBuf,
}

impl FileDatastore {
    /// Create a datastore at the given path.
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Datastore for FileDatastore {
    async fn get_state(&self) -> Result<Option<StateBlob>, StateError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no state file, starting empty");
                return Ok(None);
            }
            Err(e) => {
                return Err(StateError::Datastore(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )))
            }
        };
        let blob: StateBlob = serde_json::from_slice(&bytes).map_err(|e| {
            StateError::Datastore(format!("state file {} is not valid JSON: {e}", self.path.display()))
        })?;
        Ok(Some(blob))
    }

    async fn store_state(&self, blob: &StateBlob) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StateError::Datastore(format!("cannot create {}: {e}", parent.display())))?;
        }

        let bytes = serde_json::to_vec_pretty(blob)
            .map_err(|e| StateError::Datastore(format!("cannot serialise state blob: {e}")))?;

        // Write atomically via temp file.
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &bytes)
            .await
            .map_err(|e| StateError::Datastore(format!("cannot write {}: {e}", temp_path.display())))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StateError::Datastore(format!("cannot replace {}: {e}", self.path.display())))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "state blob persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDatastore::new(dir.path().join("state.json"));
        assert!(store.get_state().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDatastore::new(dir.path().join("state.json"));

        let blob = StateBlob {
            tag: Some("ab".repeat(16)),
            iv: Some("cd".repeat(12)),
            state: "c29tZSBzdGF0ZQ==".to_string(),
        };
        store.store_state(&blob).await.unwrap();

        let loaded = store.get_state().await.unwrap().unwrap();
        assert_eq!(loaded, blob);
    }

    #[tokio::test]
    async fn test_overwrite_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDatastore::new(dir.path().join("state.json"));

        let first = StateBlob {
            state: "one".to_string(),
            ..StateBlob::default()
        };
        let second = StateBlob {
            state: "two".to_string(),
            ..StateBlob::default()
        };
        store.store_state(&first).await.unwrap();
        store.store_state(&second).await.unwrap();

        assert_eq!(store.get_state().await.unwrap().unwrap().state, "two");
    }

    #[tokio::test]
    async fn test_corrupt_file_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let store = FileDatastore::new(&path);
        assert!(matches!(
            store.get_state().await,
            Err(StateError::Datastore(_))
        ));
    }
}
