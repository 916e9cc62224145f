//! Originator upsert semantics.
//!
//! Originators are identified by address when they have one, else by their
//! authentication token. The upsert below keeps those two flat collections
//! consistent when a record acquires an address, changes tokens, or both.

use crate::domain::entities::Originator;
use crate::domain::errors::StateError;
use crate::events::StateEvent;

/// Partial originator data applied by an upsert.
///
/// String identity fields use the empty string for "absent"; optional
/// fields are merged only when present. `authentication_messages` entries
/// are appended with duplicates dropped.
#[derive(Debug, Clone, Default)]
pub struct OriginatorUpdate {
    /// Display name.
    pub name: Option<String>,

    /// Chain the originator sends on.
    pub blockchain: Option<String>,

    /// Originator address; empty when authenticating by token only.
    pub address: String,

    /// Authentication token identifier; empty when not token-bound.
    pub auth_token_id: String,

    /// Observed public key.
    pub originator_pub_key: Option<String>,

    /// ECDH public key; `Some(None)` clears a stored key.
    pub ecdh_public_key: Option<Option<String>>,

    /// Published signature URL.
    pub url: Option<String>,

    /// Authentication verdict.
    pub authentication_valid: Option<bool>,

    /// Authentication message hashes to record.
    pub authentication_messages: Vec<String>,
}

impl OriginatorUpdate {
    fn merge_into(&self, record: &mut Originator, now: &str) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(blockchain) = &self.blockchain {
            record.blockchain = blockchain.clone();
        }
        if !self.address.is_empty() {
            record.address = self.address.clone();
        }
        if !self.auth_token_id.is_empty() {
            record.auth_token_id = self.auth_token_id.clone();
        }
        if let Some(pub_key) = &self.originator_pub_key {
            record.originator_pub_key = pub_key.clone();
        }
        if let Some(ecdh) = &self.ecdh_public_key {
            record.ecdh_public_key = ecdh.clone().unwrap_or_default();
        }
        if let Some(url) = &self.url {
            record.url = url.clone();
        }
        if let Some(valid) = self.authentication_valid {
            record.authentication_valid = valid;
        }
        for hash in &self.authentication_messages {
            if !record.authentication_messages.contains(hash) {
                record.authentication_messages.push(hash.clone());
            }
        }
        record.updated = now.to_string();
    }

    fn to_record(&self, now: &str) -> Originator {
        let mut record = Originator {
            name: "(unknown)".to_string(),
            ..Originator::default()
        };
        self.merge_into(&mut record, now);
        record
    }
}

/// Apply an upsert to the originator collection.
///
/// Returns the events describing what changed, in occurrence order.
///
/// # Errors
///
/// Returns `StateError::BadRequest` when the update carries neither an
/// address nor a token identifier.
pub fn upsert(
    originators: &mut Vec<Originator>,
    data: &OriginatorUpdate,
    now: &str,
) -> Result<Vec<StateEvent>, StateError> {
    let by_address = !data.address.is_empty();
    let by_token = !data.auth_token_id.is_empty();
    if !by_address && !by_token {
        return Err(StateError::BadRequest(
            "originator data carries neither address nor auth token".to_string(),
        ));
    }

    let idx_address = by_address
        .then(|| originators.iter().position(|o| o.matches_address(&data.address)))
        .flatten();
    let idx_token = by_token
        .then(|| {
            originators
                .iter()
                .position(|o| o.auth_token_id == data.auth_token_id)
        })
        .flatten();

    let mut events = Vec::new();

    match idx_address {
        None => match idx_token {
            // Entirely new identity.
            None => {
                originators.push(data.to_record(now));
                events.push(StateEvent::InsertedOriginator {
                    address: data.address.clone(),
                });
                if by_token {
                    events.push(StateEvent::InsertedOriginatorAuthToken {
                        auth_token_id: data.auth_token_id.clone(),
                    });
                }
            }
            // A token-only record exists: the address joins it.
            Some(idx) if !originators[idx].has_address() => {
                data.merge_into(&mut originators[idx], now);
                events.push(StateEvent::UpdatedOriginatorAuthToken {
                    auth_token_id: data.auth_token_id.clone(),
                });
            }
            // The token is bound to another addressed identity; the new
            // address supersedes that attachment.
            Some(_) => {
                originators.push(data.to_record(now));
                events.push(StateEvent::InsertedOriginator {
                    address: data.address.clone(),
                });
            }
        },
        Some(idx) => {
            // The incoming token currently belongs to a different record:
            // preserve this record's prior token binding in a new entry
            // before the merge rebinds it.
            if by_token && idx_token.is_some_and(|t| t != idx) {
                let prior = &originators[idx];
                if prior.has_auth_token() && prior.auth_token_id != data.auth_token_id {
                    let clone = Originator {
                        name: prior.name.clone(),
                        blockchain: prior.blockchain.clone(),
                        auth_token_id: prior.auth_token_id.clone(),
                        updated: now.to_string(),
                        ..Originator::default()
                    };
                    events.push(StateEvent::InsertedOriginatorAuthToken {
                        auth_token_id: clone.auth_token_id.clone(),
                    });
                    originators.push(clone);
                }
            }

            // Token-only records sharing the incoming token are absorbed
            // by the addressed record.
            if by_token {
                let mut removed = Vec::new();
                originators.retain(|o| {
                    let absorb = o.auth_token_id == data.auth_token_id
                        && !o.has_address()
                        && !o.matches_address(&data.address);
                    if absorb {
                        removed.push(StateEvent::RemovedOriginator {
                            address: String::new(),
                        });
                    }
                    !absorb
                });
                events.extend(removed);
            }

            // retain() above may have shifted the index.
            let idx = originators
                .iter()
                .position(|o| o.matches_address(&data.address))
                .ok_or_else(|| {
                    StateError::NoResource("originator vanished during upsert".to_string())
                })?;
            data.merge_into(&mut originators[idx], now);
            events.push(StateEvent::UpdatedOriginator {
                address: originators[idx].address.clone(),
            });
        }
    }

    Ok(events)
}
