//! State model entities.
//!
//! The serde shape of these types is the at-rest JSON shape; field renames
//! must not change without a migration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level gateway state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct State {
    /// Per-chain node parameters, sync status and accounts.
    pub blockchains: BTreeMap<String, ChainState>,

    /// Identities known to this gateway.
    pub originators: Vec<Originator>,

    /// At-rest pending work items.
    pub queue: Queues,

    /// Envelope-encrypted key material.
    pub crypto: KeyVault,
}

/// State kept per blockchain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChainState {
    /// Free-form node parameters.
    pub parameters: Map<String, Value>,

    /// Synchronisation status.
    pub status: ChainStatus,

    /// Accounts this gateway controls on the chain.
    pub accounts: Vec<Account>,
}

/// Synchronisation status of one chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChainStatus {
    /// Block the listener started from.
    pub starting_block: u64,

    /// Last block fully processed.
    pub current_block: u64,

    /// Highest block reported by the node.
    pub highest_block: u64,

    /// Connected peer count reported by the node.
    pub peers: u64,

    /// Whether the node reports itself as syncing.
    pub syncing: bool,

    /// Last status update, ISO 8601.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub updated: String,

    /// Chain-specific extras, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A blockchain account controlled by this gateway.
///
/// No account carries raw private key material at rest; such values are
/// lifted into the keystore at state load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    /// Account address.
    pub address: String,

    /// Chain-specific account fields, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An originator identity known to this gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Originator {
    /// Display name; `(unknown)` until authenticated with a name.
    pub name: String,

    /// Chain the originator sends on.
    pub blockchain: String,

    /// Originator address; may be empty for token-only records.
    pub address: String,

    /// Originator public key, when observed.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub originator_pub_key: String,

    /// Last ECDH public key received from the originator.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ecdh_public_key: String,

    /// URL of the originator's published authentication signature.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,

    /// Identifier of the shared authentication token, when bound.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub auth_token_id: String,

    /// Whether the originator's authentication currently holds.
    pub authentication_valid: bool,

    /// Transaction hashes of valid authentication messages; unique entries.
    pub authentication_messages: Vec<String>,

    /// Last modification, ISO 8601.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub updated: String,
}

impl Originator {
    /// Whether the record is identified by an address.
    #[must_use]
    pub fn has_address(&self) -> bool {
        !self.address.is_empty()
    }

    /// Whether the record is bound to an authentication token.
    #[must_use]
    pub fn has_auth_token(&self) -> bool {
        !self.auth_token_id.is_empty()
    }

    /// Case-insensitive address comparison, the identity rule for
    /// addressed records.
    #[must_use]
    pub fn matches_address(&self, address: &str) -> bool {
        !address.is_empty() && self.address.eq_ignore_ascii_case(address)
    }
}

/// The named at-rest queues.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Queues {
    /// Initialisation vectors waiting for their referenced message.
    pub init_vectors: Vec<Value>,

    /// Confirmation bookkeeping for observed transactions.
    pub block_depths: Vec<Value>,
}

/// Queue selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueName {
    /// The `initVectors` queue.
    InitVectors,
    /// The `blockDepths` queue.
    BlockDepths,
}

impl QueueName {
    /// The at-rest queue name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitVectors => "initVectors",
            Self::BlockDepths => "blockDepths",
        }
    }
}

impl Queues {
    /// Read access to a queue.
    #[must_use]
    pub fn get(&self, name: QueueName) -> &Vec<Value> {
        match name {
            QueueName::InitVectors => &self.init_vectors,
            QueueName::BlockDepths => &self.block_depths,
        }
    }

    /// Write access to a queue.
    pub fn get_mut(&mut self, name: QueueName) -> &mut Vec<Value> {
        match name {
            QueueName::InitVectors => &mut self.init_vectors,
            QueueName::BlockDepths => &mut self.block_depths,
        }
    }
}

/// An entry of the `initVectors` queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitVectorEntry {
    /// Hash of the `K` message that carried the vector.
    pub crypto_message_hash: String,

    /// Hash of the encrypted message the vector belongs to.
    pub ref_message_hash: String,

    /// The initialisation vector, hex encoded.
    pub init_vector: String,
}

/// An entry of the `blockDepths` queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockDepthEntry {
    /// Transaction being tracked.
    pub transaction_hash: String,

    /// Chain the transaction lives on.
    pub blockchain: String,

    /// Blocks observed on top of the transaction's block.
    pub block_depth: u64,
}

/// The keystore: envelope-encrypted keys in five buckets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyVault {
    /// Blockchain account signing keys.
    pub blockchain_keys: Vec<KeyRecord>,

    /// Own ECDH private keys per account.
    pub ecdh_private_keys: Vec<KeyRecord>,

    /// Pre-shared encryption keys per originator/account pair.
    pub preshared_keys: Vec<KeyRecord>,

    /// ECDH-negotiated shared secrets.
    pub negotiated_keys: Vec<KeyRecord>,

    /// Shared authentication token secrets.
    pub auth_tokens: Vec<KeyRecord>,
}

/// Keystore bucket selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyBucket {
    /// Blockchain account signing keys.
    BlockchainKeys,
    /// Own ECDH private keys.
    EcdhPrivateKeys,
    /// Pre-shared encryption keys.
    PresharedKeys,
    /// Negotiated shared secrets.
    NegotiatedKeys,
    /// Authentication token secrets.
    AuthTokens,
}

impl KeyBucket {
    /// The at-rest bucket name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlockchainKeys => "blockchainKeys",
            Self::EcdhPrivateKeys => "ecdhPrivateKeys",
            Self::PresharedKeys => "presharedKeys",
            Self::NegotiatedKeys => "negotiatedKeys",
            Self::AuthTokens => "authTokens",
        }
    }

    /// All buckets, for iteration.
    #[must_use]
    pub fn all() -> [Self; 5] {
        [
            Self::BlockchainKeys,
            Self::EcdhPrivateKeys,
            Self::PresharedKeys,
            Self::NegotiatedKeys,
            Self::AuthTokens,
        ]
    }
}

impl KeyVault {
    /// Read access to a bucket.
    #[must_use]
    pub fn bucket(&self, bucket: KeyBucket) -> &Vec<KeyRecord> {
        match bucket {
            KeyBucket::BlockchainKeys => &self.blockchain_keys,
            KeyBucket::EcdhPrivateKeys => &self.ecdh_private_keys,
            KeyBucket::PresharedKeys => &self.preshared_keys,
            KeyBucket::NegotiatedKeys => &self.negotiated_keys,
            KeyBucket::AuthTokens => &self.auth_tokens,
        }
    }

    /// Write access to a bucket.
    pub fn bucket_mut(&mut self, bucket: KeyBucket) -> &mut Vec<KeyRecord> {
        match bucket {
            KeyBucket::BlockchainKeys => &mut self.blockchain_keys,
            KeyBucket::EcdhPrivateKeys => &mut self.ecdh_private_keys,
            KeyBucket::PresharedKeys => &mut self.preshared_keys,
            KeyBucket::NegotiatedKeys => &mut self.negotiated_keys,
            KeyBucket::AuthTokens => &mut self.auth_tokens,
        }
    }
}

/// A stored key: identifier plus envelope-encrypted secret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyRecord {
    /// 12-octet truncated hash identifier (24 hex characters).
    pub id: String,

    /// The encrypted secret.
    pub secret: EncryptedKey,
}

/// AES-128-GCM envelope around one key, all fields hex encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EncryptedKey {
    /// 16-octet authentication tag.
    pub tag: String,

    /// 12-octet initialisation vector.
    pub iv: String,

    /// Ciphertext of the hex key string.
    pub key: String,
}
