//! The state store service.
//!
//! Owns the in-memory state behind one exclusive mutex and the master key
//! behind another. All reads hand out copies; all mutations run to
//! completion under the lock, then persist through the datastore with no
//! lock held across the write. Mutations never leave the model partially
//! written: a failed persistence is logged and retried on the next save,
//! while the in-memory model stays consistent.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::config::StateConfig;
use crate::domain::entities::{
    ChainState, KeyBucket, KeyRecord, Originator, QueueName, State,
};
use crate::domain::envelope::{self, MasterKey, StateBlob};
use crate::domain::errors::StateError;
use crate::domain::originators::{self, OriginatorUpdate};
use crate::domain::{migration, schema};
use crate::events::StateEvent;
use crate::ports::Datastore;

/// Capacity of the state event channel.
const EVENT_CAPACITY: usize = 256;

/// The protocol state store.
pub struct StateStore {
    config: StateConfig,
    datastore: Arc<dyn Datastore>,
    state: Mutex<State>,
    master_key: Mutex<Option<MasterKey>>,
    events: broadcast::Sender<StateEvent>,
}

impl StateStore {
    /// Create a store over a datastore.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Fatal` when the configured master key is not
    /// exactly 32 octets of hex.
    pub fn new(config: StateConfig, datastore: Arc<dyn Datastore>) -> Result<Self, StateError> {
        let master = MasterKey::from_hex(&config.master_key)?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            config,
            datastore,
            state: Mutex::new(State::default()),
            master_key: Mutex::new(Some(master)),
            events,
        })
    }

    /// Subscribe to state mutation events.
    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: StateEvent) {
        if self.events.send(event.clone()).is_err() {
            debug!(event = ?event, "state event dropped (no subscribers)");
        }
    }

    fn timestamp() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Run a closure against the master key.
    fn with_master<R>(
        &self,
        f: impl FnOnce(&MasterKey) -> Result<R, StateError>,
    ) -> Result<R, StateError> {
        let guard = self.master_key.lock();
        let master = guard
            .as_ref()
            .ok_or_else(|| StateError::Fatal("state store is closed".to_string()))?;
        f(master)
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Load, decrypt, migrate and validate the persisted state.
    ///
    /// An absent blob initialises an empty state. Any decrypt or schema
    /// failure is fatal: the state cannot be restored.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Fatal` on an unrecoverable blob and
    /// `StateError::Datastore` when the backend cannot be read.
    pub async fn init_state(&self) -> Result<(), StateError> {
        let blob = self.datastore.get_state().await?;

        let loaded = match blob {
            None => {
                info!("no persisted state, initialising empty");
                State::default()
            }
            Some(blob) => {
                let state_json = self.with_master(|master| envelope::extract(master, &blob))?;
                let mut state: State = serde_json::from_str(&state_json).map_err(|e| {
                    StateError::Fatal(format!("persisted state does not match schema: {e}"))
                })?;
                self.with_master(|master| migration::migrate(&mut state, master))?;
                schema::validate(&state)?;
                info!(
                    blockchains = state.blockchains.len(),
                    originators = state.originators.len(),
                    "state restored"
                );
                state
            }
        };

        *self.state.lock() = loaded;
        self.save_state().await
    }

    /// Envelope and persist the current state.
    ///
    /// Idempotent; safe to call after every mutation.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Datastore` when the backend cannot be written.
    pub async fn save_state(&self) -> Result<(), StateError> {
        let state_json = {
            let state = self.state.lock();
            serde_json::to_string(&*state)
                .map_err(|e| StateError::Datastore(format!("cannot serialise state: {e}")))?
        };

        let blob = if self.config.encryption {
            self.with_master(|master| envelope::enclose(master, &state_json))?
        } else {
            StateBlob {
                tag: None,
                iv: None,
                state: state_json,
            }
        };

        self.datastore.store_state(&blob).await?;

        if let Some(path) = &self.config.state_file {
            if let Err(e) = mirror_to_file(path, &blob).await {
                warn!(path = %path.display(), error = %e, "state mirror write failed");
            }
        }

        self.emit(StateEvent::Saved);
        Ok(())
    }

    /// Flush once, then clear the master key from memory.
    ///
    /// After closing, any operation that needs key material fails.
    ///
    /// # Errors
    ///
    /// Propagates the final save failure.
    pub async fn close_state(&self) -> Result<(), StateError> {
        self.save_state().await?;
        *self.master_key.lock() = None;
        self.emit(StateEvent::Closed);
        info!("state store closed, master key cleared");
        Ok(())
    }

    // =========================================================================
    // BLOCKCHAINS
    // =========================================================================

    /// All known chains.
    #[must_use]
    pub fn get_blockchains(&self) -> BTreeMap<String, ChainState> {
        self.state.lock().blockchains.clone()
    }

    /// One chain's state.
    #[must_use]
    pub fn get_blockchain_data(&self, name: &str) -> Option<ChainState> {
        self.state.lock().blockchains.get(name).cloned()
    }

    /// Replace or insert a chain's state.
    ///
    /// # Errors
    ///
    /// Propagates persistence failures.
    pub async fn update_blockchain_data(
        &self,
        name: &str,
        data: ChainState,
    ) -> Result<(), StateError> {
        self.state.lock().blockchains.insert(name.to_string(), data);
        self.emit(StateEvent::UpdatedBlockchain {
            blockchain: name.to_string(),
        });
        self.save_state().await
    }

    /// Write one account record to a sidecar backup file.
    ///
    /// # Errors
    ///
    /// `StateError::NoResource` for an unknown chain or account,
    /// `StateError::BadRequest` when no backup directory is configured.
    pub async fn backup_account(&self, chain: &str, address: &str) -> Result<PathBuf, StateError> {
        let account = {
            let state = self.state.lock();
            let chain_state = state
                .blockchains
                .get(chain)
                .ok_or_else(|| StateError::NoResource(format!("unknown blockchain {chain}")))?;
            chain_state
                .accounts
                .iter()
                .find(|a| a.address.eq_ignore_ascii_case(address))
                .cloned()
                .ok_or_else(|| {
                    StateError::NoResource(format!("unknown account {address} on {chain}"))
                })?
        };

        let dir = self
            .config
            .account_backup_dir
            .clone()
            .ok_or_else(|| StateError::BadRequest("no account backup directory configured".to_string()))?;
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StateError::Datastore(format!("cannot create {}: {e}", dir.display())))?;

        let path = dir.join(format!("account-{chain}-{address}.json"));
        let body = serde_json::json!({ "blockchain": chain, "account": account });
        let bytes = serde_json::to_vec_pretty(&body)
            .map_err(|e| StateError::Datastore(format!("cannot serialise account: {e}")))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StateError::Datastore(format!("cannot write {}: {e}", path.display())))?;

        info!(blockchain = chain, address, path = %path.display(), "account backed up");
        Ok(path)
    }

    // =========================================================================
    // ORIGINATORS
    // =========================================================================

    /// All originator records.
    #[must_use]
    pub fn get_originators(&self) -> Vec<Originator> {
        self.state.lock().originators.clone()
    }

    /// The originator with the given address, case-insensitive.
    #[must_use]
    pub fn get_originator_data(&self, address: &str) -> Option<Originator> {
        self.state
            .lock()
            .originators
            .iter()
            .find(|o| o.matches_address(address))
            .cloned()
    }

    /// Insert or merge originator data; see the upsert semantics in
    /// `domain::originators`.
    ///
    /// # Errors
    ///
    /// `StateError::BadRequest` for identityless data; persistence errors.
    pub async fn upsert_originator_data(
        &self,
        data: &OriginatorUpdate,
    ) -> Result<Vec<StateEvent>, StateError> {
        let now = Self::timestamp();
        let events = {
            let mut state = self.state.lock();
            originators::upsert(&mut state.originators, data, &now)?
        };
        for event in &events {
            self.emit(event.clone());
        }
        self.save_state().await?;
        Ok(events)
    }

    /// Remove the originator with the given address.
    ///
    /// # Errors
    ///
    /// `StateError::NoResource` when no such originator exists.
    pub async fn remove_originator_data(&self, address: &str) -> Result<(), StateError> {
        let removed = {
            let mut state = self.state.lock();
            let before = state.originators.len();
            state.originators.retain(|o| !o.matches_address(address));
            before != state.originators.len()
        };
        if !removed {
            return Err(StateError::NoResource(format!(
                "no originator with address {address}"
            )));
        }
        self.emit(StateEvent::RemovedOriginator {
            address: address.to_string(),
        });
        self.save_state().await
    }

    /// Remove one authentication message hash from an originator.
    ///
    /// When the last hash goes, the originator's authentication no longer
    /// holds and `authentication_valid` drops to `false`. Returns whether
    /// the authentication still holds.
    ///
    /// # Errors
    ///
    /// `StateError::NoResource` for an unknown originator or hash.
    pub async fn remove_originator_auth_message(
        &self,
        address: &str,
        transaction_hash: &str,
    ) -> Result<bool, StateError> {
        let (event, still_valid) = {
            let mut state = self.state.lock();
            let originator = state
                .originators
                .iter_mut()
                .find(|o| o.matches_address(address))
                .ok_or_else(|| {
                    StateError::NoResource(format!("no originator with address {address}"))
                })?;
            let before = originator.authentication_messages.len();
            originator
                .authentication_messages
                .retain(|hash| hash != transaction_hash);
            if originator.authentication_messages.len() == before {
                return Err(StateError::NoResource(format!(
                    "originator {address} has no authentication message {transaction_hash}"
                )));
            }
            if originator.authentication_messages.is_empty() {
                originator.authentication_valid = false;
            }
            originator.updated = Self::timestamp();
            (
                StateEvent::UpdatedOriginator {
                    address: originator.address.clone(),
                },
                originator.authentication_valid,
            )
        };
        self.emit(event);
        self.save_state().await?;
        Ok(still_valid)
    }

    /// The originator bound to the given auth token.
    #[must_use]
    pub fn get_originator_auth_token(&self, token_id: &str) -> Option<Originator> {
        if token_id.is_empty() {
            return None;
        }
        self.state
            .lock()
            .originators
            .iter()
            .find(|o| o.auth_token_id == token_id)
            .cloned()
    }

    /// Unbind an auth token. A token-only record is removed entirely; an
    /// addressed record merely loses the binding.
    ///
    /// # Errors
    ///
    /// `StateError::NoResource` when no record carries the token.
    pub async fn remove_originator_auth_token(&self, token_id: &str) -> Result<(), StateError> {
        let event = {
            let mut state = self.state.lock();
            let Some(index) = state
                .originators
                .iter()
                .position(|o| o.auth_token_id == token_id)
            else {
                return Err(StateError::NoResource(format!(
                    "no originator bound to token {token_id}"
                )));
            };
            if state.originators[index].has_address() {
                state.originators[index].auth_token_id = String::new();
                state.originators[index].updated = Self::timestamp();
                StateEvent::UpdatedOriginator {
                    address: state.originators[index].address.clone(),
                }
            } else {
                state.originators.remove(index);
                StateEvent::RemovedOriginator {
                    address: String::new(),
                }
            }
        };
        self.emit(event);
        self.save_state().await
    }

    // =========================================================================
    // QUEUES
    // =========================================================================

    /// All items of a queue.
    #[must_use]
    pub fn get_queue(&self, name: QueueName) -> Vec<Value> {
        self.state.lock().queue.get(name).clone()
    }

    /// The first queue item whose `property` equals `value`.
    #[must_use]
    pub fn get_queue_data(&self, name: QueueName, property: &str, value: &str) -> Option<Value> {
        self.state
            .lock()
            .queue
            .get(name)
            .iter()
            .find(|item| item.get(property).and_then(Value::as_str) == Some(value))
            .cloned()
    }

    /// Insert a queue item, or replace the item sharing its `property`.
    ///
    /// # Errors
    ///
    /// `StateError::BadRequest` when `data` lacks a string `property`.
    pub async fn upsert_queue_data(
        &self,
        name: QueueName,
        property: &str,
        data: Value,
    ) -> Result<(), StateError> {
        let key = data
            .get(property)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                StateError::BadRequest(format!("queue item lacks string property {property}"))
            })?
            .to_string();

        let event = {
            let mut state = self.state.lock();
            let queue = state.queue.get_mut(name);
            match queue
                .iter_mut()
                .find(|item| item.get(property).and_then(Value::as_str) == Some(key.as_str()))
            {
                Some(existing) => {
                    *existing = data;
                    StateEvent::UpdatedQueue { queue: name }
                }
                None => {
                    queue.push(data);
                    StateEvent::InsertedInQueue { queue: name }
                }
            }
        };
        self.emit(event);
        self.save_state().await
    }

    /// Remove queue items whose `property` equals `value`.
    ///
    /// Returns whether anything was removed; removing a missing item is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Propagates persistence failures.
    pub async fn remove_queue_data(
        &self,
        name: QueueName,
        property: &str,
        value: &str,
    ) -> Result<bool, StateError> {
        let removed = {
            let mut state = self.state.lock();
            let queue = state.queue.get_mut(name);
            let before = queue.len();
            queue.retain(|item| item.get(property).and_then(Value::as_str) != Some(value));
            before != queue.len()
        };
        if removed {
            self.emit(StateEvent::RemovedFromQueue { queue: name });
            self.save_state().await?;
        }
        Ok(removed)
    }

    // =========================================================================
    // KEYSTORE
    // =========================================================================

    /// Identifiers stored in a bucket.
    #[must_use]
    pub fn get_key_ids(&self, bucket: KeyBucket) -> Vec<String> {
        self.state
            .lock()
            .crypto
            .bucket(bucket)
            .iter()
            .map(|r| r.id.clone())
            .collect()
    }

    /// Whether a bucket holds the given id.
    #[must_use]
    pub fn has_key(&self, bucket: KeyBucket, id: &str) -> bool {
        self.state
            .lock()
            .crypto
            .bucket(bucket)
            .iter()
            .any(|r| r.id == id)
    }

    /// Decrypt one key into a zeroising buffer.
    ///
    /// # Errors
    ///
    /// `StateError::NoResource` for an unknown id, `StateError::Corrupted`
    /// for envelope failures, `StateError::Fatal` after close.
    pub fn get_key(&self, bucket: KeyBucket, id: &str) -> Result<Zeroizing<String>, StateError> {
        let record = self
            .state
            .lock()
            .crypto
            .bucket(bucket)
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| {
                StateError::NoResource(format!("no key {id} in {}", bucket.as_str()))
            })?;
        self.with_master(|master| envelope::open_key(master, id, &record.secret))
    }

    /// Envelope-encrypt and store a key, replacing any record with the
    /// same id.
    ///
    /// # Errors
    ///
    /// `StateError::Fatal` after close; persistence failures.
    pub async fn upsert_key(
        &self,
        bucket: KeyBucket,
        id: &str,
        raw_hex: &str,
    ) -> Result<(), StateError> {
        let secret = self.with_master(|master| envelope::seal_key(master, id, raw_hex))?;
        let record = KeyRecord {
            id: id.to_string(),
            secret,
        };

        let event = {
            let mut state = self.state.lock();
            let bucket_records = state.crypto.bucket_mut(bucket);
            match bucket_records.iter_mut().find(|r| r.id == id) {
                Some(existing) => {
                    *existing = record;
                    StateEvent::UpdatedKey {
                        bucket,
                        id: id.to_string(),
                    }
                }
                None => {
                    bucket_records.push(record);
                    StateEvent::InsertedKey {
                        bucket,
                        id: id.to_string(),
                    }
                }
            }
        };
        self.emit(event);
        self.save_state().await
    }

    /// Remove a key by id. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Propagates persistence failures.
    pub async fn remove_key(&self, bucket: KeyBucket, id: &str) -> Result<bool, StateError> {
        let removed = {
            let mut state = self.state.lock();
            let bucket_records = state.crypto.bucket_mut(bucket);
            let before = bucket_records.len();
            bucket_records.retain(|r| r.id != id);
            before != bucket_records.len()
        };
        if removed {
            self.emit(StateEvent::RemovedKey {
                bucket,
                id: id.to_string(),
            });
            self.save_state().await?;
        }
        Ok(removed)
    }

    /// Validate the current in-memory state; test and diagnostics hook.
    ///
    /// # Errors
    ///
    /// Returns the schema violation, if any.
    pub fn validate(&self) -> Result<(), StateError> {
        schema::validate(&self.state.lock())
    }
}

async fn mirror_to_file(path: &std::path::Path, blob: &StateBlob) -> Result<(), StateError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StateError::Datastore(format!("cannot create {}: {e}", parent.display())))?;
    }
    let bytes = serde_json::to_vec_pretty(blob)
        .map_err(|e| StateError::Datastore(format!("cannot serialise blob: {e}")))?;
    let temp = path.with_extension("tmp");
    tokio::fs::write(&temp, &bytes)
        .await
        .map_err(|e| StateError::Datastore(format!("cannot write {}: {e}", temp.display())))?;
    tokio::fs::rename(&temp, path)
        .await
        .map_err(|e| StateError::Datastore(format!("cannot replace {}: {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryDatastore;

    fn test_store() -> StateStore {
        StateStore::new(StateConfig::for_testing(), Arc::new(InMemoryDatastore::new())).unwrap()
    }

    #[test]
    fn test_bad_master_key_is_fatal() {
        let config = StateConfig {
            master_key: "abcd".to_string(),
            ..StateConfig::for_testing()
        };
        let result = StateStore::new(config, Arc::new(InMemoryDatastore::new()));
        assert!(matches!(result, Err(StateError::Fatal(_))));
    }

    #[tokio::test]
    async fn test_init_empty_then_persisted() {
        let datastore = Arc::new(InMemoryDatastore::new());
        let store =
            StateStore::new(StateConfig::for_testing(), datastore.clone()).unwrap();
        store.init_state().await.unwrap();
        assert!(datastore.stored());
        assert!(store.get_originators().is_empty());
    }

    #[tokio::test]
    async fn test_state_survives_reload() {
        let datastore = Arc::new(InMemoryDatastore::new());
        let store =
            StateStore::new(StateConfig::for_testing(), datastore.clone()).unwrap();
        store.init_state().await.unwrap();

        let update = OriginatorUpdate {
            name: Some("Org".to_string()),
            address: "0xAA".to_string(),
            ..OriginatorUpdate::default()
        };
        store.upsert_originator_data(&update).await.unwrap();

        // A second store over the same datastore sees the originator.
        let reloaded =
            StateStore::new(StateConfig::for_testing(), datastore).unwrap();
        reloaded.init_state().await.unwrap();
        let originator = reloaded.get_originator_data("0xaa").unwrap();
        assert_eq!(originator.name, "Org");
    }

    #[tokio::test]
    async fn test_keystore_roundtrip() {
        let store = test_store();
        store.init_state().await.unwrap();

        let id = "ab".repeat(12);
        store
            .upsert_key(KeyBucket::PresharedKeys, &id, "deadbeef")
            .await
            .unwrap();
        assert_eq!(store.get_key_ids(KeyBucket::PresharedKeys), vec![id.clone()]);
        assert_eq!(
            store.get_key(KeyBucket::PresharedKeys, &id).unwrap().as_str(),
            "deadbeef"
        );

        // Replacing under the same id updates in place.
        store
            .upsert_key(KeyBucket::PresharedKeys, &id, "cafebabe")
            .await
            .unwrap();
        assert_eq!(store.get_key_ids(KeyBucket::PresharedKeys).len(), 1);
        assert_eq!(
            store.get_key(KeyBucket::PresharedKeys, &id).unwrap().as_str(),
            "cafebabe"
        );

        assert!(store.remove_key(KeyBucket::PresharedKeys, &id).await.unwrap());
        assert!(!store.remove_key(KeyBucket::PresharedKeys, &id).await.unwrap());
        assert!(matches!(
            store.get_key(KeyBucket::PresharedKeys, &id),
            Err(StateError::NoResource(_))
        ));
    }

    #[tokio::test]
    async fn test_close_clears_master_key() {
        let store = test_store();
        store.init_state().await.unwrap();
        let id = "cd".repeat(12);
        store
            .upsert_key(KeyBucket::AuthTokens, &id, "00ff")
            .await
            .unwrap();

        store.close_state().await.unwrap();
        assert!(matches!(
            store.get_key(KeyBucket::AuthTokens, &id),
            Err(StateError::Fatal(_))
        ));
    }

    #[tokio::test]
    async fn test_queue_lifecycle() {
        let store = test_store();
        store.init_state().await.unwrap();

        let entry = serde_json::json!({
            "cryptoMessageHash": "kmsg",
            "refMessageHash": "h1",
            "initVector": "v1",
        });
        store
            .upsert_queue_data(QueueName::InitVectors, "refMessageHash", entry)
            .await
            .unwrap();
        store.validate().unwrap();

        let updated = serde_json::json!({
            "cryptoMessageHash": "kmsg",
            "refMessageHash": "h1",
            "initVector": "v2",
        });
        store
            .upsert_queue_data(QueueName::InitVectors, "refMessageHash", updated)
            .await
            .unwrap();
        let queue = store.get_queue(QueueName::InitVectors);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0]["initVector"], "v2");

        assert!(store
            .remove_queue_data(QueueName::InitVectors, "refMessageHash", "h1")
            .await
            .unwrap());
        assert!(store.get_queue(QueueName::InitVectors).is_empty());
        store.validate().unwrap();
    }

    #[tokio::test]
    async fn test_events_emitted_on_mutation() {
        let store = test_store();
        store.init_state().await.unwrap();
        let mut events = store.subscribe_events();

        let update = OriginatorUpdate {
            address: "0xAA".to_string(),
            blockchain: Some("blockchain-test".to_string()),
            ..OriginatorUpdate::default()
        };
        store.upsert_originator_data(&update).await.unwrap();

        let event = events.recv().await.unwrap();
        assert!(matches!(event, StateEvent::InsertedOriginator { .. }));
        let event = events.recv().await.unwrap();
        assert!(matches!(event, StateEvent::Saved));
    }

    #[tokio::test]
    async fn test_remove_auth_token_semantics() {
        let store = test_store();
        store.init_state().await.unwrap();

        // Token-only record is removed entirely.
        let token_only = OriginatorUpdate {
            auth_token_id: "token-x".to_string(),
            ..OriginatorUpdate::default()
        };
        store.upsert_originator_data(&token_only).await.unwrap();
        store.remove_originator_auth_token("token-x").await.unwrap();
        assert!(store.get_originator_auth_token("token-x").is_none());
        assert!(store.get_originators().is_empty());

        // Addressed record only loses the binding.
        let bound = OriginatorUpdate {
            address: "0xAA".to_string(),
            auth_token_id: "token-y".to_string(),
            ..OriginatorUpdate::default()
        };
        store.upsert_originator_data(&bound).await.unwrap();
        store.remove_originator_auth_token("token-y").await.unwrap();
        let record = store.get_originator_data("0xAA").unwrap();
        assert!(record.auth_token_id.is_empty());
    }

    #[tokio::test]
    async fn test_unencrypted_fallback_blob() {
        let datastore = Arc::new(InMemoryDatastore::new());
        let config = StateConfig {
            encryption: false,
            ..StateConfig::for_testing()
        };
        let store = StateStore::new(config, datastore.clone()).unwrap();
        store.init_state().await.unwrap();

        let blob = datastore.get_state().await.unwrap().unwrap();
        assert!(!blob.is_encrypted());
        assert!(blob.state.contains("originators"));
    }
}
