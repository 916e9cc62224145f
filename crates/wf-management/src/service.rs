//! The management service.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use wf_auth::{AuthError, AuthenticationService};
use wf_bus::{Buses, EventFilter, MessageEventKind};
use wf_crypto::{key_id, EcdhKeyPair};
use wf_protocol::{CryptoDataType, MessageCode, ReferenceIndicator, WfMessage};
use wf_state::{InitVectorEntry, KeyBucket, OriginatorUpdate, QueueName, StateError, StateStore};

use crate::config::ManagementConfig;
use crate::errors::ManagementError;
use crate::ports::MessageRetriever;

/// The management plane.
pub struct ManagementService {
    config: ManagementConfig,
    state: Arc<StateStore>,
    buses: Buses,
    auth: Arc<AuthenticationService>,
    retriever: Arc<dyn MessageRetriever>,
}

impl ManagementService {
    /// Create the plane over its collaborators.
    #[must_use]
    pub fn new(
        config: ManagementConfig,
        state: Arc<StateStore>,
        buses: Buses,
        auth: Arc<AuthenticationService>,
        retriever: Arc<dyn MessageRetriever>,
    ) -> Self {
        Self {
            config,
            state,
            buses,
            auth,
            retriever,
        }
    }

    /// Subscribe to both streams and handle events until they close.
    ///
    /// Every tx `MessageProcessed` schedules its after-send handling on a
    /// separate task so a long delay never blocks the event loops.
    pub fn spawn(self: &Arc<Self>) -> Vec<tokio::task::JoinHandle<()>> {
        // Subscriptions are taken before the tasks start, so no event
        // emitted after this call returns is missed.
        let mut rx_subscription = self
            .buses
            .rx
            .subscribe(EventFilter::kinds(vec![MessageEventKind::MessageProcessed]));
        let rx_service = Arc::clone(self);
        let rx_handle = tokio::spawn(async move {
            while let Ok(event) = rx_subscription.recv().await {
                if let Err(e) = rx_service.handle_rx_message(&event.message).await {
                    warn!(error = %e, "rx message handling failed");
                }
            }
        });

        let mut tx_subscription = self
            .buses
            .tx
            .subscribe(EventFilter::kinds(vec![MessageEventKind::MessageProcessed]));
        let tx_service = Arc::clone(self);
        let tx_handle = tokio::spawn(async move {
            while let Ok(event) = tx_subscription.recv().await {
                let service = Arc::clone(&tx_service);
                tokio::spawn(async move {
                    tokio::time::sleep(service.config.after_send_delay()).await;
                    if let Err(e) = service.handle_after_send(&event.message).await {
                        warn!(error = %e, "after-send handling failed");
                    }
                });
            }
        });

        vec![rx_handle, tx_handle]
    }

    /// Dispatch one processed inbound message.
    ///
    /// # Errors
    ///
    /// Propagates state and retrieval failures; protocol-level rejections
    /// are logged and swallowed.
    pub async fn handle_rx_message(&self, message: &WfMessage) -> Result<(), ManagementError> {
        match message.code() {
            Some(MessageCode::Authentication) => {
                if message.is_own() {
                    debug!("own authentication message, nothing to verify");
                } else if message.reference().is_some_and(|r| r.retracts()) {
                    match self.auth.remove_authentication(message).await {
                        Ok(()) => {}
                        Err(AuthError::State(StateError::NoResource(reason))) => {
                            debug!(reason = reason.as_str(), "nothing to retract");
                        }
                        Err(e) => return Err(e.into()),
                    }
                } else {
                    match self.auth.verify_message(message).await {
                        Ok(verdict) => debug!(verdict = ?verdict, "authentication verified"),
                        Err(AuthError::Protocol(e)) => {
                            warn!(error = %e, "originator authentication failed");
                        }
                        Err(AuthError::Retrieval(e)) => {
                            warn!(error = %e, "signature retrieval failed");
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                self.buses
                    .rx
                    .emit(MessageEventKind::MessageUpdated, message.clone());
            }
            Some(MessageCode::Cryptographic) => match message.crypto_data_type() {
                Some(CryptoDataType::InitVector1 | CryptoDataType::InitVector2) => {
                    self.receive_init_vector(message).await?;
                }
                Some(CryptoDataType::EcdhPublicKey) => {
                    self.receive_ecdh_public_key(message).await?;
                }
                None => debug!("crypto message with unhandled data type"),
            },
            _ => {}
        }
        Ok(())
    }

    /// Handle a received initialisation vector, by reference indicator.
    async fn receive_init_vector(&self, message: &WfMessage) -> Result<(), ManagementError> {
        let iv = message
            .crypto_data()
            .ok_or_else(|| ManagementError::BadMessage("crypto message without data".to_string()))?;
        let referenced = message.message_header.referenced_message.clone();

        match message.reference() {
            // A stand-alone vector pairs with nothing yet.
            Some(ReferenceIndicator::Original) | None => {}

            Some(ReferenceIndicator::Recall) | Some(ReferenceIndicator::Discontinue) => {
                let removed = self
                    .state
                    .remove_queue_data(QueueName::InitVectors, "cryptoMessageHash", &referenced)
                    .await?;
                debug!(referenced = referenced.as_str(), removed, "init vector retracted");
            }

            Some(ReferenceIndicator::Update) => {
                if let Some(mut entry) = self.state.get_queue_data(
                    QueueName::InitVectors,
                    "cryptoMessageHash",
                    &referenced,
                ) {
                    entry["initVector"] = json!(iv);
                    self.state
                        .upsert_queue_data(QueueName::InitVectors, "cryptoMessageHash", entry)
                        .await?;
                }
            }

            Some(ReferenceIndicator::Append) => {
                let target = self
                    .retriever
                    .get_message(&message.meta_header.blockchain, &referenced)
                    .await
                    .map_err(|e| ManagementError::Retrieve(e.to_string()))?;

                match target {
                    Some(mut target) => {
                        if target.is_own()
                            && !target.meta_header.encryption_init_vector.is_empty()
                        {
                            debug!(
                                referenced = referenced.as_str(),
                                "sent message already carries its init vector"
                            );
                        } else {
                            target.meta_header.encryption_init_vector = iv.to_string();
                            self.buses
                                .rx
                                .emit(MessageEventKind::MessageReceived, target);
                        }
                    }
                    None => {
                        // The encrypted message has not arrived yet: park
                        // the vector until it does.
                        let entry = InitVectorEntry {
                            crypto_message_hash: message.meta_header.transaction_hash.clone(),
                            ref_message_hash: referenced.clone(),
                            init_vector: iv.to_string(),
                        };
                        self.state
                            .upsert_queue_data(
                                QueueName::InitVectors,
                                "refMessageHash",
                                serde_json::to_value(&entry).unwrap_or_default(),
                            )
                            .await?;
                        info!(
                            referenced = referenced.as_str(),
                            "init vector queued for a message not yet seen"
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// Handle a received ECDH public key, by reference indicator.
    async fn receive_ecdh_public_key(&self, message: &WfMessage) -> Result<(), ManagementError> {
        let payload = message
            .crypto_data()
            .ok_or_else(|| ManagementError::BadMessage("crypto message without data".to_string()))?;
        let peer_address = message.meta_header.originator_address.clone();
        if peer_address.is_empty() {
            return Err(ManagementError::BadMessage(
                "ECDH key message without originator address".to_string(),
            ));
        }
        let chain = message.meta_header.blockchain.clone();

        match message.reference() {
            Some(ReferenceIndicator::Original) | Some(ReferenceIndicator::Update) | None => {
                let update = OriginatorUpdate {
                    blockchain: Some(chain.clone()),
                    address: peer_address.clone(),
                    ecdh_public_key: Some(Some(payload.to_string())),
                    ..OriginatorUpdate::default()
                };
                self.state.upsert_originator_data(&update).await?;

                let authenticated = self
                    .state
                    .get_originator_data(&peer_address)
                    .is_some_and(|o| o.authentication_valid);
                if !authenticated {
                    debug!(
                        address = peer_address.as_str(),
                        "peer not authenticated, deferring key negotiation"
                    );
                    return Ok(());
                }
                let Some(chain_state) = self.state.get_blockchain_data(&chain) else {
                    debug!(blockchain = chain.as_str(), "unknown chain, no negotiation");
                    return Ok(());
                };
                for account in &chain_state.accounts {
                    self.negotiate_shared_secret(&chain, &account.address, &peer_address, payload)
                        .await?;
                }
            }
            Some(reference) if reference.retracts() => {
                if self.state.get_originator_data(&peer_address).is_some() {
                    let update = OriginatorUpdate {
                        address: peer_address.clone(),
                        ecdh_public_key: Some(None),
                        ..OriginatorUpdate::default()
                    };
                    self.state.upsert_originator_data(&update).await?;
                    debug!(address = peer_address.as_str(), "peer ECDH key cleared");
                }
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// Compute and store the shared secret between one local account and a
    /// peer's published key.
    async fn negotiate_shared_secret(
        &self,
        chain: &str,
        own_address: &str,
        peer_address: &str,
        peer_public_hex: &str,
    ) -> Result<(), ManagementError> {
        let own_id = key_id(&[chain, own_address]);
        let secret_hex = match self.state.get_key(KeyBucket::EcdhPrivateKeys, &own_id) {
            Ok(secret) => secret,
            Err(StateError::NoResource(_)) => {
                debug!(
                    account = own_address,
                    "no ECDH key pair for account, skipping negotiation"
                );
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let pair = EcdhKeyPair::from_secret_hex(&secret_hex)
            .map_err(|e| ManagementError::Crypto(e.to_string()))?;
        let shared = pair
            .shared_secret(peer_public_hex)
            .map_err(|e| ManagementError::Crypto(e.to_string()))?;

        let negotiated_id = key_id(&[chain, own_address, peer_address]);
        self.state
            .upsert_key(
                KeyBucket::NegotiatedKeys,
                &negotiated_id,
                &hex::encode(shared.as_slice()),
            )
            .await?;
        info!(
            blockchain = chain,
            account = own_address,
            peer = peer_address,
            "shared encryption secret negotiated"
        );
        Ok(())
    }

    /// Auto-responses observed a settling delay after a sent message was
    /// processed.
    ///
    /// # Errors
    ///
    /// Propagates state failures; response construction problems are
    /// logged only.
    pub async fn handle_after_send(&self, message: &WfMessage) -> Result<(), ManagementError> {
        // Encrypted messages get their initialisation vector sent after
        // them as a plaintext K message referencing the transaction.
        if message.is_encrypted() && !message.meta_header.encryption_init_vector.is_empty() {
            let data_type = match message.message_header.encryption_indicator {
                '1' => CryptoDataType::InitVector1,
                _ => CryptoDataType::InitVector2,
            };
            let response = WfMessage::crypto(
                &message.meta_header.blockchain,
                data_type,
                &message.meta_header.encryption_init_vector,
                ReferenceIndicator::Append,
                &message.meta_header.transaction_hash,
            );
            info!(
                referenced = message.meta_header.transaction_hash.as_str(),
                "committing init vector message for sent encrypted message"
            );
            self.buses
                .tx
                .emit(MessageEventKind::MessageCommitted, response);
        }

        // Plain authentication messages are answered with our ECDH public
        // key so the peer can negotiate an encryption secret.
        if message.code() == Some(MessageCode::Authentication)
            && !message.is_encrypted()
            && !message.under_duress()
        {
            match message.reference() {
                Some(ReferenceIndicator::Original) => {
                    self.resend_ecdh_public_key(message).await?;
                }
                Some(ReferenceIndicator::Update) => {
                    self.renew_ecdh_key_pair(message).await?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Commit the stored ECDH public key of the sending account.
    async fn resend_ecdh_public_key(&self, message: &WfMessage) -> Result<(), ManagementError> {
        let chain = &message.meta_header.blockchain;
        let own_address = &message.meta_header.originator_address;
        let id = key_id(&[chain, own_address]);

        let secret_hex = match self.state.get_key(KeyBucket::EcdhPrivateKeys, &id) {
            Ok(secret) => secret,
            Err(StateError::NoResource(_)) => {
                debug!(account = own_address.as_str(), "no ECDH key pair to announce");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let pair = EcdhKeyPair::from_secret_hex(&secret_hex)
            .map_err(|e| ManagementError::Crypto(e.to_string()))?;

        self.commit_ecdh_key_message(message, &pair.public_key_hex());
        Ok(())
    }

    /// Generate a fresh ECDH key pair, announce it, and renegotiate every
    /// stored peer secret under it.
    async fn renew_ecdh_key_pair(&self, message: &WfMessage) -> Result<(), ManagementError> {
        let chain = message.meta_header.blockchain.clone();
        let own_address = message.meta_header.originator_address.clone();
        let id = key_id(&[&chain, &own_address]);

        let pair = EcdhKeyPair::generate();
        self.state
            .upsert_key(KeyBucket::EcdhPrivateKeys, &id, &pair.secret_hex())
            .await?;
        info!(account = own_address.as_str(), "new ECDH key pair generated");

        self.commit_ecdh_key_message(message, &pair.public_key_hex());

        for originator in self.state.get_originators() {
            if originator.blockchain == chain && !originator.ecdh_public_key.is_empty() {
                self.negotiate_shared_secret(
                    &chain,
                    &own_address,
                    &originator.address,
                    &originator.ecdh_public_key,
                )
                .await?;
            }
        }
        Ok(())
    }

    fn commit_ecdh_key_message(&self, message: &WfMessage, public_key_hex: &str) {
        let response = WfMessage::crypto(
            &message.meta_header.blockchain,
            CryptoDataType::EcdhPublicKey,
            public_key_hex,
            ReferenceIndicator::Original,
            &message.meta_header.transaction_hash,
        );
        info!(
            referenced = message.meta_header.transaction_hash.as_str(),
            "committing ECDH public key message"
        );
        self.buses
            .tx
            .emit(MessageEventKind::MessageCommitted, response);
    }
}
