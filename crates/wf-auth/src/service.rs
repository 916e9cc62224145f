//! Verification, retraction and creation of originator authentication.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;
use zeroize::Zeroizing;

use wf_crypto::{derive_auth_token_hex, key_id};
use wf_protocol::{
    MessageCode, ProtocolError, ProtocolErrorKind, ReferenceIndicator, VerificationMethod,
    WfMessage,
};
use wf_state::{KeyBucket, OriginatorUpdate, StateStore};

use crate::config::AuthConfig;
use crate::errors::AuthError;
use crate::jws::{self, FlatJws, SignaturePayload};
use crate::ports::SignatureFetcher;

/// Non-error outcome of a verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthVerdict {
    /// The originator's authentication holds and was recorded.
    Valid,
    /// The message was rejected before verification, e.g. by the domain
    /// allowlist; the originator was marked invalid.
    Invalid(String),
}

/// Request to create a published authentication signature.
#[derive(Debug, Clone)]
pub struct SignRequest {
    /// Claims to sign.
    pub payload: SignaturePayload,
    /// Account address the signature binds to.
    pub address: String,
    /// Chain of the account.
    pub blockchain: String,
}

/// A created signature with its decoded claims.
#[derive(Debug, Clone)]
pub struct SignedSignature {
    /// The flattened JWS to publish.
    pub jws: FlatJws,
    /// The claims, for display.
    pub decoded: Value,
}

/// The authentication plane.
pub struct AuthenticationService {
    config: AuthConfig,
    state: Arc<StateStore>,
    fetcher: Arc<dyn SignatureFetcher>,
}

impl AuthenticationService {
    /// Create the plane over the state store and a signature fetcher.
    #[must_use]
    pub fn new(
        config: AuthConfig,
        state: Arc<StateStore>,
        fetcher: Arc<dyn SignatureFetcher>,
    ) -> Self {
        Self {
            config,
            state,
            fetcher,
        }
    }

    /// Verify the originator authentication carried by an `A` message.
    ///
    /// # Errors
    ///
    /// `WF_AUTH_ERROR` with all contributing causes when verification
    /// fails; the originator is marked invalid first. Retrieval failures
    /// surface as [`AuthError::Retrieval`] without a verdict.
    pub async fn verify_message(&self, message: &WfMessage) -> Result<AuthVerdict, AuthError> {
        if message.code() != Some(MessageCode::Authentication) {
            return Err(AuthError::BadRequest(
                "not an authentication message".to_string(),
            ));
        }
        match message.verification_method() {
            Some(VerificationMethod::Signature) => self.verify_signature_method(message).await,
            Some(VerificationMethod::Token) => self.verify_token_method(message).await,
            None => Err(AuthError::BadRequest(
                "unknown verification method".to_string(),
            )),
        }
    }

    /// Method 1: fetch and check the published digital signature.
    async fn verify_signature_method(
        &self,
        message: &WfMessage,
    ) -> Result<AuthVerdict, AuthError> {
        let verification_data = message
            .verification_data()
            .ok_or_else(|| AuthError::BadRequest("message carries no verification data".to_string()))?;

        let url = match Url::parse(verification_data) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            Ok(url) => {
                self.mark_invalid(message).await?;
                return Err(self.auth_failure(vec![format!(
                    "verification URL scheme {} is not http(s)",
                    url.scheme()
                )]));
            }
            Err(e) => {
                self.mark_invalid(message).await?;
                return Err(self.auth_failure(vec![format!(
                    "verification data is not a URL: {e}"
                )]));
            }
        };

        let host = url.host_str().unwrap_or_default();
        if !self.config.domain_allowed(host) {
            warn!(host, "signature URL host not in the configured domains");
            self.mark_invalid(message).await?;
            return Ok(AuthVerdict::Invalid(format!(
                "host {host} is not an accepted signature domain"
            )));
        }

        let body = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|e| AuthError::Retrieval(e.to_string()))?;
        let flat_jws: FlatJws = match serde_json::from_str(&body) {
            Ok(jws) => jws,
            Err(e) => {
                self.mark_invalid(message).await?;
                return Err(self.auth_failure(vec![format!(
                    "published signature is not a flattened JWS: {e}"
                )]));
            }
        };

        let public_key = &message.meta_header.originator_pub_key;
        if public_key.is_empty() {
            self.mark_invalid(message).await?;
            return Err(self.auth_failure(vec![
                "message metadata carries no originator public key".to_string(),
            ]));
        }

        let claims = match jws::verify(&flat_jws, public_key) {
            Ok(claims) => claims,
            Err(e) => {
                self.mark_invalid(message).await?;
                return Err(e);
            }
        };

        let originator_address = &message.meta_header.originator_address;
        let mut causes = Vec::new();
        if !claims.addr.eq_ignore_ascii_case(originator_address) {
            causes.push(format!(
                "signed address {} does not match originator address {originator_address}",
                claims.addr
            ));
        }
        if claims.url != verification_data {
            causes.push(format!(
                "signed URL {} does not match the announced URL {verification_data}",
                claims.url
            ));
        }
        if !causes.is_empty() {
            self.mark_invalid(message).await?;
            return Err(self.auth_failure(causes));
        }

        let update = OriginatorUpdate {
            name: Some(claims.orgname.clone()),
            blockchain: Some(message.meta_header.blockchain.clone()),
            address: originator_address.clone(),
            originator_pub_key: Some(public_key.clone()),
            url: Some(claims.url.clone()),
            authentication_valid: Some(true),
            authentication_messages: self.recorded_messages(message),
            ..OriginatorUpdate::default()
        };
        self.state.upsert_originator_data(&update).await?;

        info!(
            address = originator_address.as_str(),
            orgname = claims.orgname.as_str(),
            "originator authenticated by published signature"
        );
        Ok(AuthVerdict::Valid)
    }

    /// Method 2: try every known shared token.
    async fn verify_token_method(&self, message: &WfMessage) -> Result<AuthVerdict, AuthError> {
        let verification_data = message
            .verification_data()
            .ok_or_else(|| AuthError::BadRequest("message carries no verification data".to_string()))?;
        let originator_address = &message.meta_header.originator_address;
        let address_bytes = binary_address(originator_address);

        for id in self.state.get_key_ids(KeyBucket::AuthTokens) {
            let secret_hex = match self.state.get_key(KeyBucket::AuthTokens, &id) {
                Ok(secret) => secret,
                Err(e) => {
                    warn!(id = id.as_str(), error = %e, "skipping unreadable auth token");
                    continue;
                }
            };
            let mut secret = match hex::decode(secret_hex.as_str()) {
                Ok(secret) => Zeroizing::new(secret),
                Err(e) => {
                    warn!(id = id.as_str(), error = %e, "auth token secret is not hex");
                    continue;
                }
            };
            let derived = match derive_auth_token_hex(&mut secret, &address_bytes) {
                Ok(derived) => derived,
                Err(e) => {
                    warn!(id = id.as_str(), error = %e, "token derivation failed");
                    continue;
                }
            };

            if derived.eq_ignore_ascii_case(verification_data) {
                // A known name survives, whether the record was seen by
                // address or pre-created token-first.
                let prior_name = self
                    .state
                    .get_originator_data(originator_address)
                    .or_else(|| self.state.get_originator_auth_token(&id))
                    .map(|o| o.name)
                    .filter(|name| !name.is_empty());

                let update = OriginatorUpdate {
                    name: Some(prior_name.unwrap_or_else(|| "(unknown)".to_string())),
                    blockchain: Some(message.meta_header.blockchain.clone()),
                    address: originator_address.clone(),
                    auth_token_id: id.clone(),
                    authentication_valid: Some(true),
                    authentication_messages: self.recorded_messages(message),
                    ..OriginatorUpdate::default()
                };
                self.state.upsert_originator_data(&update).await?;

                info!(
                    address = originator_address.as_str(),
                    auth_token_id = id.as_str(),
                    "originator authenticated by shared token"
                );
                return Ok(AuthVerdict::Valid);
            }
        }

        debug!(
            address = originator_address.as_str(),
            "no known token derives the received verification data"
        );
        self.mark_invalid(message).await?;
        Err(self.auth_failure(vec![
            "unknown originator authentication token".to_string(),
        ]))
    }

    /// Retract authentication on a recall or discontinue message.
    ///
    /// # Errors
    ///
    /// `StateError::NoResource` when the originator or the referenced
    /// message is unknown.
    pub async fn remove_authentication(&self, message: &WfMessage) -> Result<(), AuthError> {
        if !message.reference().is_some_and(|r| r.retracts()) {
            return Err(AuthError::BadRequest(
                "message does not recall or discontinue".to_string(),
            ));
        }
        let address = &message.meta_header.originator_address;
        let referenced = &message.message_header.referenced_message;

        let still_valid = self
            .state
            .remove_originator_auth_message(address, referenced)
            .await?;
        info!(
            address = address.as_str(),
            referenced = referenced.as_str(),
            still_valid,
            "authentication message retracted"
        );
        Ok(())
    }

    /// Create a publishable signature for one of this gateway's accounts.
    ///
    /// # Errors
    ///
    /// `WF_SIGN_ERROR` with all contributing causes for inconsistent
    /// claims or missing key material.
    pub fn create_signature(&self, request: &SignRequest) -> Result<SignedSignature, AuthError> {
        let mut causes = Vec::new();
        if request.payload.addr.is_empty() {
            causes.push("payload carries no addr claim".to_string());
        } else if !request.payload.addr.eq_ignore_ascii_case(&request.address) {
            causes.push(format!(
                "payload addr {} does not match account address {}",
                request.payload.addr, request.address
            ));
        }
        if request.payload.orgname.is_empty() {
            causes.push("payload carries no orgname claim".to_string());
        }
        if request.payload.url.is_empty() {
            causes.push("payload carries no url claim".to_string());
        }
        if !causes.is_empty() {
            return Err(AuthError::Protocol(ProtocolError::new(
                ProtocolErrorKind::SignatureError,
                causes,
            )));
        }

        let id = key_id(&[&request.blockchain, &request.address]);
        let secret_hex = self
            .state
            .get_key(KeyBucket::BlockchainKeys, &id)
            .map_err(|e| {
                AuthError::Protocol(ProtocolError::single(
                    ProtocolErrorKind::SignatureError,
                    format!("no signing key for account {}: {e}", request.address),
                ))
            })?;

        let jws = jws::create(&request.payload, &secret_hex)?;
        let decoded = serde_json::to_value(&request.payload).map_err(|e| {
            AuthError::Protocol(ProtocolError::single(
                ProtocolErrorKind::SignatureError,
                format!("cannot decode payload: {e}"),
            ))
        })?;
        Ok(SignedSignature { jws, decoded })
    }

    /// Hashes recorded on the originator: only an original message starts
    /// a new authentication trail.
    fn recorded_messages(&self, message: &WfMessage) -> Vec<String> {
        if message.reference() == Some(ReferenceIndicator::Original)
            && !message.meta_header.transaction_hash.is_empty()
        {
            vec![message.meta_header.transaction_hash.clone()]
        } else {
            Vec::new()
        }
    }

    async fn mark_invalid(&self, message: &WfMessage) -> Result<(), AuthError> {
        let update = OriginatorUpdate {
            blockchain: Some(message.meta_header.blockchain.clone()),
            address: message.meta_header.originator_address.clone(),
            authentication_valid: Some(false),
            ..OriginatorUpdate::default()
        };
        if update.address.is_empty() {
            // Nothing to pin the verdict on.
            return Ok(());
        }
        self.state.upsert_originator_data(&update).await?;
        Ok(())
    }

    fn auth_failure(&self, causes: Vec<String>) -> AuthError {
        AuthError::Protocol(ProtocolError::new(
            ProtocolErrorKind::AuthenticationError,
            causes,
        ))
    }
}

/// The binary form of a chain address: hex-decoded where possible, raw
/// bytes otherwise.
#[must_use]
pub fn binary_address(address: &str) -> Vec<u8> {
    let stripped = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);
    hex::decode(stripped).unwrap_or_else(|_| address.as_bytes().to_vec())
}
