//! State validation.
//!
//! The typed model already pins the at-rest shape; this pass checks the
//! invariants the shape cannot express. Runs after load (where a failure
//! is fatal) and may be re-run after any mutation in tests.

use std::collections::HashSet;

use crate::domain::entities::{KeyBucket, State};
use crate::domain::errors::StateError;

/// Validate the state invariants.
///
/// # Errors
///
/// Returns `StateError::Fatal` listing every violated invariant.
pub fn validate(state: &State) -> Result<(), StateError> {
    let mut problems = Vec::new();

    for bucket in KeyBucket::all() {
        let mut seen = HashSet::new();
        for record in state.crypto.bucket(bucket) {
            if record.id.len() != 24 || !record.id.bytes().all(|b| b.is_ascii_hexdigit()) {
                problems.push(format!(
                    "key id '{}' in {} is not 12 octets of hex",
                    record.id,
                    bucket.as_str()
                ));
            }
            if !seen.insert(record.id.as_str()) {
                problems.push(format!(
                    "duplicate key id '{}' in {}",
                    record.id,
                    bucket.as_str()
                ));
            }
        }
    }

    for (index, originator) in state.originators.iter().enumerate() {
        if !originator.has_address() && !originator.has_auth_token() {
            problems.push(format!(
                "originator #{index} has neither address nor auth token"
            ));
        }
        let unique: HashSet<&String> = originator.authentication_messages.iter().collect();
        if unique.len() != originator.authentication_messages.len() {
            problems.push(format!(
                "originator '{}' has duplicate authentication messages",
                originator.address
            ));
        }
    }

    for (chain, chain_state) in &state.blockchains {
        for account in &chain_state.accounts {
            if account.extra.contains_key("privateKey") {
                problems.push(format!(
                    "account {} on {chain} still carries a plaintext private key",
                    account.address
                ));
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(StateError::Fatal(format!(
            "state schema invalid: {}",
            problems.join("; ")
        )))
    }
}
