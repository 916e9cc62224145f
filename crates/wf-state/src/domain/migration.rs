//! State migration at load time.
//!
//! Two legacy shapes are repaired before the state is accepted:
//! accounts that still carry a plaintext private key, and originators
//! with duplicated authentication message hashes. Missing top-level
//! collections are already covered by the serde defaults of the model.

use tracing::{info, warn};
use wf_crypto::key_id;

use crate::domain::entities::{KeyRecord, State};
use crate::domain::envelope::{self, MasterKey};
use crate::domain::errors::StateError;

/// Legacy account field holding a plaintext private key.
const PRIVATE_KEY_FIELD: &str = "privateKey";

/// Repair legacy state shapes in place.
///
/// Plaintext account private keys are lifted into `crypto.blockchainKeys`
/// under `key_id(chain || address)` and erased from the account; duplicate
/// authentication message hashes are dropped.
///
/// # Errors
///
/// Returns `StateError::Corrupted` when a lifted key cannot be sealed.
pub fn migrate(state: &mut State, master: &MasterKey) -> Result<(), StateError> {
    lift_plaintext_keys(state, master)?;
    dedupe_authentication_messages(state);
    Ok(())
}

fn lift_plaintext_keys(state: &mut State, master: &MasterKey) -> Result<(), StateError> {
    let mut lifted: Vec<KeyRecord> = Vec::new();

    for (chain, chain_state) in &mut state.blockchains {
        for account in &mut chain_state.accounts {
            let Some(value) = account.extra.remove(PRIVATE_KEY_FIELD) else {
                continue;
            };
            let Some(raw_hex) = value.as_str() else {
                warn!(
                    blockchain = chain.as_str(),
                    address = account.address.as_str(),
                    "dropping non-string private key field from account"
                );
                continue;
            };

            let id = key_id(&[chain, &account.address]);
            let secret = envelope::seal_key(master, &id, raw_hex)?;
            info!(
                blockchain = chain.as_str(),
                address = account.address.as_str(),
                id = id.as_str(),
                "lifted plaintext account key into keystore"
            );
            lifted.push(KeyRecord { id, secret });
        }
    }

    for record in lifted {
        let bucket = &mut state.crypto.blockchain_keys;
        match bucket.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => bucket.push(record),
        }
    }
    Ok(())
}

fn dedupe_authentication_messages(state: &mut State) {
    for originator in &mut state.originators {
        let before = originator.authentication_messages.len();
        let mut seen = Vec::with_capacity(before);
        originator.authentication_messages.retain(|hash| {
            if seen.contains(hash) {
                false
            } else {
                seen.push(hash.clone());
                true
            }
        });
        let dropped = before - originator.authentication_messages.len();
        if dropped > 0 {
            info!(
                address = originator.address.as_str(),
                dropped, "deduplicated authentication messages"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Account, ChainState, Originator};

    fn test_master() -> MasterKey {
        MasterKey::from_hex(&hex::encode([7u8; 32])).unwrap()
    }

    #[test]
    fn test_plaintext_key_lifted_and_erased() {
        let mut state = State::default();
        let mut account = Account {
            address: "0xA1B2".to_string(),
            ..Account::default()
        };
        account.extra.insert(
            PRIVATE_KEY_FIELD.to_string(),
            serde_json::json!("00112233445566778899aabbccddeeff"),
        );
        state.blockchains.insert(
            "blockchain-test".to_string(),
            ChainState {
                accounts: vec![account],
                ..ChainState::default()
            },
        );

        let master = test_master();
        migrate(&mut state, &master).unwrap();

        let account = &state.blockchains["blockchain-test"].accounts[0];
        assert!(!account.extra.contains_key(PRIVATE_KEY_FIELD));

        let expected_id = key_id(&["blockchain-test", "0xA1B2"]);
        let record = state
            .crypto
            .blockchain_keys
            .iter()
            .find(|r| r.id == expected_id)
            .expect("key record created");
        let opened = envelope::open_key(&master, &record.id, &record.secret).unwrap();
        assert_eq!(opened.as_str(), "00112233445566778899aabbccddeeff");
    }

    #[test]
    fn test_auth_messages_deduped_in_order() {
        let mut state = State::default();
        state.originators.push(Originator {
            address: "0xA1".to_string(),
            authentication_messages: ["h1", "h2", "h1", "h3", "h2"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            ..Originator::default()
        });

        migrate(&mut state, &test_master()).unwrap();
        assert_eq!(
            state.originators[0].authentication_messages,
            vec!["h1", "h2", "h3"]
        );
    }

    #[test]
    fn test_clean_state_untouched() {
        let mut state = State::default();
        migrate(&mut state, &test_master()).unwrap();
        assert!(state.crypto.blockchain_keys.is_empty());
    }
}
