//! State store end-to-end scenarios.

use std::sync::Arc;

use serde_json::json;
use wf_crypto::key_id;
use wf_state::{
    Datastore, InMemoryDatastore, KeyBucket, OriginatorUpdate, QueueName, StateBlob, StateConfig,
    StateStore,
};

const CHAIN: &str = "blockchain-test";

async fn fresh_store() -> Arc<StateStore> {
    let store = Arc::new(
        StateStore::new(
            StateConfig::for_testing(),
            Arc::new(InMemoryDatastore::new()),
        )
        .unwrap(),
    );
    store.init_state().await.unwrap();
    store
}

#[tokio::test]
async fn test_init_vector_queue_lifecycle() {
    let store = fresh_store().await;

    // Upsert, update, remove; the schema must hold after each step.
    store
        .upsert_queue_data(
            QueueName::InitVectors,
            "refMessageHash",
            json!({
                "cryptoMessageHash": "0xk1",
                "refMessageHash": "0xh1",
                "initVector": "v1",
            }),
        )
        .await
        .unwrap();
    store.validate().unwrap();

    store
        .upsert_queue_data(
            QueueName::InitVectors,
            "refMessageHash",
            json!({
                "cryptoMessageHash": "0xk1",
                "refMessageHash": "0xh1",
                "initVector": "v2",
            }),
        )
        .await
        .unwrap();
    store.validate().unwrap();
    let queue = store.get_queue(QueueName::InitVectors);
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0]["initVector"], "v2");

    store
        .remove_queue_data(QueueName::InitVectors, "refMessageHash", "0xh1")
        .await
        .unwrap();
    store.validate().unwrap();
    assert!(store.get_queue(QueueName::InitVectors).is_empty());
}

#[tokio::test]
async fn test_originator_reupsert_appends_and_invalidates() {
    let store = fresh_store().await;

    // First upsert: authenticated with seven recorded messages.
    let first = OriginatorUpdate {
        name: Some("Org 5".to_string()),
        blockchain: Some(CHAIN.to_string()),
        address: "0x5A".to_string(),
        authentication_valid: Some(true),
        authentication_messages: (0..7).map(|i| format!("0xhash{i}")).collect(),
        ..OriginatorUpdate::default()
    };
    store.upsert_originator_data(&first).await.unwrap();

    // Second upsert flips the verdict and appends one more message.
    let second = OriginatorUpdate {
        address: "0x5a".to_string(),
        authentication_valid: Some(false),
        authentication_messages: vec!["0xhash7".to_string()],
        ..OriginatorUpdate::default()
    };
    store.upsert_originator_data(&second).await.unwrap();

    let originator = store.get_originator_data("0x5A").unwrap();
    assert_eq!(originator.authentication_messages.len(), 8);
    assert!(!originator.authentication_valid);
    assert_eq!(originator.name, "Org 5");
    store.validate().unwrap();
}

#[tokio::test]
async fn test_token_first_originator_gains_address() {
    let store = fresh_store().await;

    let token_only = OriginatorUpdate {
        name: Some("Named Org".to_string()),
        blockchain: Some(CHAIN.to_string()),
        auth_token_id: "0xtokenT".to_string(),
        ..OriginatorUpdate::default()
    };
    store.upsert_originator_data(&token_only).await.unwrap();

    let record = store.get_originator_auth_token("0xtokenT").unwrap();
    assert_eq!(record.address, "");
    assert_eq!(record.name, "Named Org");

    // The address arrives later and merges into the token-only record.
    let with_address = OriginatorUpdate {
        address: "0xA1".to_string(),
        auth_token_id: "0xtokenT".to_string(),
        ..OriginatorUpdate::default()
    };
    store.upsert_originator_data(&with_address).await.unwrap();

    assert_eq!(store.get_originators().len(), 1);
    let record = store.get_originator_auth_token("0xtokenT").unwrap();
    assert_eq!(record.address, "0xA1");
    assert_eq!(record.name, "Named Org");
}

#[tokio::test]
async fn test_plaintext_account_key_migrated_on_load() {
    let datastore = Arc::new(InMemoryDatastore::new());

    // A legacy unencrypted blob with a plaintext account private key.
    let raw_key = "e331b6d69882b4cb4ea581d88e0b604039a3de5967688d3dcffdd2270c0fd109";
    let legacy_state = json!({
        "blockchains": {
            CHAIN: {
                "parameters": {},
                "status": {},
                "accounts": [
                    { "address": "0xA1B2C3", "privateKey": raw_key }
                ]
            }
        },
        "originators": [],
        "queue": { "initVectors": [], "blockDepths": [] },
        "crypto": {}
    });
    datastore
        .store_state(&StateBlob {
            tag: None,
            iv: None,
            state: legacy_state.to_string(),
        })
        .await
        .unwrap();

    let store = StateStore::new(StateConfig::for_testing(), datastore).unwrap();
    store.init_state().await.unwrap();

    // The account no longer carries the key.
    let chain_state = store.get_blockchain_data(CHAIN).unwrap();
    assert!(!chain_state.accounts[0].extra.contains_key("privateKey"));

    // The keystore does, envelope-encrypted, and decrypts to the original.
    let id = key_id(&[CHAIN, "0xA1B2C3"]);
    let restored = store.get_key(KeyBucket::BlockchainKeys, &id).unwrap();
    assert_eq!(restored.as_str(), raw_key);
    store.validate().unwrap();
}

#[tokio::test]
async fn test_envelope_survives_reload_via_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    {
        let store = StateStore::new(
            StateConfig::for_testing(),
            Arc::new(wf_state::FileDatastore::new(&path)),
        )
        .unwrap();
        store.init_state().await.unwrap();
        store
            .upsert_key(KeyBucket::PresharedKeys, &"ab".repeat(12), "deadbeef")
            .await
            .unwrap();
        store.close_state().await.unwrap();
    }

    // The file on disk is an encrypted envelope, not plaintext.
    let on_disk = std::fs::read_to_string(&path).unwrap();
    assert!(on_disk.contains("\"tag\""));
    assert!(!on_disk.contains("deadbeef"));

    // A fresh store with the same master key restores everything.
    let store = StateStore::new(
        StateConfig::for_testing(),
        Arc::new(wf_state::FileDatastore::new(&path)),
    )
    .unwrap();
    store.init_state().await.unwrap();
    let key = store
        .get_key(KeyBucket::PresharedKeys, &"ab".repeat(12))
        .unwrap();
    assert_eq!(key.as_str(), "deadbeef");
}

#[tokio::test]
async fn test_wrong_master_key_cannot_restore() {
    let datastore = Arc::new(InMemoryDatastore::new());
    {
        let store = StateStore::new(StateConfig::for_testing(), datastore.clone()).unwrap();
        store.init_state().await.unwrap();
    }

    let other_key_config = StateConfig {
        master_key: "2d".repeat(32),
        ..StateConfig::for_testing()
    };
    let store = StateStore::new(other_key_config, datastore).unwrap();
    assert!(store.init_state().await.is_err());
}
