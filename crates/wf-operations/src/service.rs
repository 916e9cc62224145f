//! The operations service.

use std::sync::Arc;

use tracing::info;
use zeroize::Zeroizing;

use wf_crypto::key_id;
use wf_protocol::ProcessingError;
use wf_state::{KeyBucket, Originator, OriginatorUpdate, StateError, StateStore};

use crate::errors::OperationError;

/// Request to store a shared authentication token.
///
/// The secret is consumed by the operation and wiped afterwards.
pub struct StoreAuthTokenRequest {
    /// Display name of the originator the token authenticates.
    pub name: String,
    /// Chain the originator sends on.
    pub blockchain: String,
    /// Originator address, when already known.
    pub address: String,
    /// The raw token secret, hex encoded.
    pub secret: Zeroizing<String>,
}

/// The operator surface over the state store.
pub struct OperationsService {
    state: Arc<StateStore>,
}

impl OperationsService {
    /// Create the surface over a state store.
    #[must_use]
    pub fn new(state: Arc<StateStore>) -> Self {
        Self { state }
    }

    // =========================================================================
    // ORIGINATORS
    // =========================================================================

    /// All known originators.
    #[must_use]
    pub fn get_originators(&self) -> Vec<Originator> {
        self.state.get_originators()
    }

    /// One originator by address.
    ///
    /// # Errors
    ///
    /// `ProcessingError::NoResource` for an unknown address.
    pub fn get_originator(&self, address: &str) -> Result<Originator, OperationError> {
        self.state.get_originator_data(address).ok_or_else(|| {
            ProcessingError::NoResource(format!("no originator with address {address}")).into()
        })
    }

    /// Insert or merge originator data.
    ///
    /// # Errors
    ///
    /// Propagates upsert and persistence failures.
    pub async fn update_originator(
        &self,
        update: &OriginatorUpdate,
    ) -> Result<(), OperationError> {
        self.state.upsert_originator_data(update).await?;
        Ok(())
    }

    /// Remove an originator record.
    ///
    /// # Errors
    ///
    /// `StateError::NoResource` for an unknown address.
    pub async fn remove_originator(&self, address: &str) -> Result<(), OperationError> {
        self.state.remove_originator_data(address).await?;
        Ok(())
    }

    // =========================================================================
    // PRE-SHARED KEYS
    // =========================================================================

    /// The keystore id of the pre-shared key between an originator and a
    /// local account.
    ///
    /// # Errors
    ///
    /// `ProcessingError::NoResource` for an unknown originator.
    fn preshared_key_id(
        &self,
        originator_address: &str,
        account_address: &str,
    ) -> Result<String, OperationError> {
        let originator = self.get_originator(originator_address)?;
        Ok(key_id(&[
            &originator.blockchain,
            originator_address,
            account_address,
        ]))
    }

    /// Decrypt the pre-shared key for an originator/account pair.
    ///
    /// # Errors
    ///
    /// `NoResource` when the originator or the key is unknown.
    pub fn get_preshared_key(
        &self,
        originator_address: &str,
        account_address: &str,
    ) -> Result<Zeroizing<String>, OperationError> {
        let id = self.preshared_key_id(originator_address, account_address)?;
        Ok(self.state.get_key(KeyBucket::PresharedKeys, &id)?)
    }

    /// Store a pre-shared key for an originator/account pair.
    ///
    /// The originator must be known and the account must exist on the
    /// originator's chain. The raw key is wiped when the call returns.
    ///
    /// # Errors
    ///
    /// `NoResource` for an unknown originator or account.
    pub async fn store_preshared_key(
        &self,
        originator_address: &str,
        account_address: &str,
        raw_key_hex: Zeroizing<String>,
    ) -> Result<(), OperationError> {
        let originator = self.get_originator(originator_address)?;
        let chain_state = self
            .state
            .get_blockchain_data(&originator.blockchain)
            .ok_or_else(|| {
                ProcessingError::NoResource(format!(
                    "unknown blockchain {}",
                    originator.blockchain
                ))
            })?;
        if !chain_state
            .accounts
            .iter()
            .any(|a| a.address.eq_ignore_ascii_case(account_address))
        {
            return Err(ProcessingError::NoResource(format!(
                "no account {account_address} on {}",
                originator.blockchain
            ))
            .into());
        }

        let id = key_id(&[&originator.blockchain, originator_address, account_address]);
        self.state
            .upsert_key(KeyBucket::PresharedKeys, &id, &raw_key_hex)
            .await?;
        info!(
            originator = originator_address,
            account = account_address,
            "pre-shared key stored"
        );
        Ok(())
    }

    /// Delete the pre-shared key for an originator/account pair.
    ///
    /// Indicative: deleting a key that does not exist succeeds with an
    /// informational string.
    ///
    /// # Errors
    ///
    /// `NoResource` for an unknown originator.
    pub async fn delete_preshared_key(
        &self,
        originator_address: &str,
        account_address: &str,
    ) -> Result<Option<String>, OperationError> {
        let id = self.preshared_key_id(originator_address, account_address)?;
        let removed = self.state.remove_key(KeyBucket::PresharedKeys, &id).await?;
        Ok((!removed).then(|| "pre-shared key did not exist".to_string()))
    }

    // =========================================================================
    // AUTH TOKENS
    // =========================================================================

    /// The originator record bound to a token.
    ///
    /// # Errors
    ///
    /// `ProcessingError::NoResource` for an unknown token id.
    pub fn get_auth_token(&self, token_id: &str) -> Result<Originator, OperationError> {
        self.state.get_originator_auth_token(token_id).ok_or_else(|| {
            ProcessingError::NoResource(format!("no originator bound to token {token_id}")).into()
        })
    }

    /// Store a shared authentication token and bind it to an originator
    /// record.
    ///
    /// The token id is derived from the chain and the secret; storing the
    /// same secret twice conflicts. The secret is wiped when the call
    /// returns. Returns the token id.
    ///
    /// # Errors
    ///
    /// `ProcessingError::Conflict` for a duplicate token.
    pub async fn store_auth_token(
        &self,
        request: StoreAuthTokenRequest,
    ) -> Result<String, OperationError> {
        if request.blockchain.is_empty() {
            return Err(
                ProcessingError::BadRequest("token carries no blockchain".to_string()).into(),
            );
        }
        if request.secret.is_empty() {
            return Err(ProcessingError::BadRequest("token carries no secret".to_string()).into());
        }

        let token_id = key_id(&[&request.blockchain, &request.secret]);
        if self.state.has_key(KeyBucket::AuthTokens, &token_id) {
            return Err(ProcessingError::Conflict(format!(
                "auth token {token_id} already exists"
            ))
            .into());
        }

        self.state
            .upsert_key(KeyBucket::AuthTokens, &token_id, &request.secret)
            .await?;

        let update = OriginatorUpdate {
            name: Some(request.name.clone()),
            blockchain: Some(request.blockchain.clone()),
            address: request.address.clone(),
            auth_token_id: token_id.clone(),
            ..OriginatorUpdate::default()
        };
        self.state.upsert_originator_data(&update).await?;

        info!(auth_token_id = token_id.as_str(), "auth token stored");
        Ok(token_id)
    }

    /// Delete a shared authentication token and its originator binding.
    ///
    /// Indicative: a missing binding is reported as information, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Propagates persistence failures.
    pub async fn delete_auth_token(
        &self,
        token_id: &str,
    ) -> Result<Option<String>, OperationError> {
        let removed = self.state.remove_key(KeyBucket::AuthTokens, token_id).await?;
        let unbound = match self.state.remove_originator_auth_token(token_id).await {
            Ok(()) => true,
            Err(StateError::NoResource(_)) => false,
            Err(e) => return Err(e.into()),
        };

        if removed || unbound {
            info!(auth_token_id = token_id, "auth token deleted");
        }
        Ok((!removed).then(|| "auth token did not exist".to_string()))
    }
}
