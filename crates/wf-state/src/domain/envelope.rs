//! Envelope encryption of the state blob and individual keys.
//!
//! A 32-octet master encryption key seeds two derivations:
//!
//! - `DEK  = HKDF(MEK, DEK_SALT, "DEK-00", 32)` with AES-256-GCM over the
//!   whole state JSON
//! - `KEK(id) = HKDF(MEK, KEK_SALT, "KEK-" || id, 16)` with AES-128-GCM
//!   over one hex key string
//!
//! Both salts are fixed constants baked into the build. The master key is
//! held in a zeroising buffer and cleared when the store closes.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use wf_crypto::{
    decrypt_aes128_gcm, decrypt_aes256_gcm, encrypt_aes128_gcm, encrypt_aes256_gcm, kdf,
};

use crate::domain::entities::EncryptedKey;
use crate::domain::errors::StateError;

/// Salt for the data encryption key derivation.
pub const DEK_SALT: [u8; 32] = [
    0x84, 0x9c, 0x1f, 0x7a, 0x2d, 0x5b, 0xe3, 0x91, 0x4e, 0xa7, 0x08, 0xc6, 0x53, 0xbf, 0x72,
    0x0d, 0x96, 0x31, 0xd8, 0x45, 0xea, 0x6c, 0x17, 0xb2, 0x5f, 0xc9, 0x3a, 0x80, 0x24, 0xdb,
    0x66, 0x0e,
];

/// Salt for the per-key encryption key derivation.
pub const KEK_SALT: [u8; 32] = [
    0x2b, 0xe8, 0x54, 0x9d, 0x07, 0xc3, 0x6f, 0xa1, 0xd2, 0x38, 0x9b, 0x46, 0xe0, 0x7d, 0x15,
    0xcc, 0x62, 0xaf, 0x09, 0x58, 0xf4, 0x1b, 0xd7, 0x83, 0x2e, 0x90, 0x4c, 0xb5, 0x6a, 0x01,
    0xfe, 0x39,
];

/// Derivation info prefix for the data encryption key.
const DEK_INFO: &[u8] = b"DEK-00";

/// Derivation info prefix for key encryption keys.
const KEK_INFO_PREFIX: &[u8] = b"KEK-";

/// The state blob as exchanged with the datastore.
///
/// Encrypted form carries `tag` and `iv`; the unencrypted fallback carries
/// the state JSON directly in `state`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateBlob {
    /// GCM authentication tag, hex (32 characters), when encrypted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// GCM initialisation vector, hex (24 characters), when encrypted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iv: Option<String>,

    /// Base64 ciphertext, or the plain state JSON in the fallback form.
    pub state: String,
}

impl StateBlob {
    /// Whether the blob carries an encrypted state.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.tag.is_some() && self.iv.is_some()
    }
}

/// The master encryption key, held in a zeroising buffer.
pub struct MasterKey {
    key: Zeroizing<[u8; 32]>,
}

impl MasterKey {
    /// Parse a hex-configured master key.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Fatal` unless the key is exactly 32 octets.
    pub fn from_hex(key_hex: &str) -> Result<Self, StateError> {
        let decoded = Zeroizing::new(
            hex::decode(key_hex.trim())
                .map_err(|e| StateError::Fatal(format!("master key is not hex: {e}")))?,
        );
        if decoded.len() != 32 {
            return Err(StateError::Fatal(format!(
                "master key must be 32 octets, got {}",
                decoded.len()
            )));
        }
        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&decoded);
        Ok(Self { key })
    }

    fn derive(&self, salt: &[u8], info: &[u8], length: usize) -> Zeroizing<Vec<u8>> {
        // The derivation consumes and wipes a copy; the master key itself
        // stays intact until the store closes.
        let mut ikm = Zeroizing::new(*self.key);
        let okm = kdf::hkdf(&mut ikm[..], salt, info, length)
            .expect("derived key length is a fixed valid constant");
        Zeroizing::new(okm)
    }

    /// The data encryption key for the state blob.
    #[must_use]
    pub fn data_key(&self) -> Zeroizing<Vec<u8>> {
        self.derive(&DEK_SALT, DEK_INFO, 32)
    }

    /// The key encryption key for one keystore id.
    #[must_use]
    pub fn key_key(&self, id: &str) -> Zeroizing<Vec<u8>> {
        let mut info = Vec::with_capacity(KEK_INFO_PREFIX.len() + id.len());
        info.extend_from_slice(KEK_INFO_PREFIX);
        info.extend_from_slice(id.as_bytes());
        self.derive(&KEK_SALT, &info, 16)
    }
}

/// Envelope the state JSON for persistence.
///
/// # Errors
///
/// Returns `StateError::Corrupted` when the cipher fails.
pub fn enclose(master: &MasterKey, state_json: &str) -> Result<StateBlob, StateError> {
    let dek = master.data_key();
    let sealed = encrypt_aes256_gcm(&dek, state_json.as_bytes())
        .map_err(|e| StateError::Corrupted(format!("cannot enclose state: {e}")))?;
    Ok(StateBlob {
        tag: Some(hex::encode(sealed.tag)),
        iv: Some(hex::encode(sealed.iv)),
        state: BASE64.encode(&sealed.ciphertext),
    })
}

/// Open a state blob back into the state JSON.
///
/// A blob without `tag` and `iv` is the unencrypted fallback and is
/// returned as-is.
///
/// # Errors
///
/// Returns `StateError::Fatal` when authentication fails (the state cannot
/// be restored) and `StateError::Corrupted` for malformed envelope fields.
pub fn extract(master: &MasterKey, blob: &StateBlob) -> Result<String, StateError> {
    let (Some(tag_hex), Some(iv_hex)) = (&blob.tag, &blob.iv) else {
        return Ok(blob.state.clone());
    };

    let tag = hex::decode(tag_hex)
        .map_err(|e| StateError::Corrupted(format!("state blob tag is not hex: {e}")))?;
    let iv = hex::decode(iv_hex)
        .map_err(|e| StateError::Corrupted(format!("state blob iv is not hex: {e}")))?;
    let ciphertext = BASE64
        .decode(&blob.state)
        .map_err(|e| StateError::Corrupted(format!("state blob is not base64: {e}")))?;

    let dek = master.data_key();
    let plaintext = decrypt_aes256_gcm(&dek, &iv, &tag, &ciphertext)
        .map_err(|e| StateError::Fatal(format!("cannot restore state: {e}")))?;
    String::from_utf8(plaintext)
        .map_err(|e| StateError::Fatal(format!("restored state is not utf-8: {e}")))
}

/// Envelope one raw hex key under its key encryption key.
///
/// # Errors
///
/// Returns `StateError::Corrupted` when the cipher fails.
pub fn seal_key(master: &MasterKey, id: &str, raw_hex: &str) -> Result<EncryptedKey, StateError> {
    let kek = master.key_key(id);
    let sealed = encrypt_aes128_gcm(&kek, raw_hex.as_bytes())
        .map_err(|e| StateError::Corrupted(format!("cannot seal key {id}: {e}")))?;
    Ok(EncryptedKey {
        tag: hex::encode(sealed.tag),
        iv: hex::encode(sealed.iv),
        key: hex::encode(&sealed.ciphertext),
    })
}

/// Open one envelope-encrypted key back into its raw hex form.
///
/// # Errors
///
/// Returns `StateError::Corrupted` for missing envelope fields or an
/// authentication failure.
pub fn open_key(
    master: &MasterKey,
    id: &str,
    secret: &EncryptedKey,
) -> Result<Zeroizing<String>, StateError> {
    if secret.tag.is_empty() || secret.iv.is_empty() {
        return Err(StateError::Corrupted(format!(
            "key {id} is missing its envelope tag or iv"
        )));
    }
    let tag = hex::decode(&secret.tag)
        .map_err(|e| StateError::Corrupted(format!("key {id} tag is not hex: {e}")))?;
    let iv = hex::decode(&secret.iv)
        .map_err(|e| StateError::Corrupted(format!("key {id} iv is not hex: {e}")))?;
    let ciphertext = hex::decode(&secret.key)
        .map_err(|e| StateError::Corrupted(format!("key {id} ciphertext is not hex: {e}")))?;

    let kek = master.key_key(id);
    let plaintext = decrypt_aes128_gcm(&kek, &iv, &tag, &ciphertext)
        .map_err(|e| StateError::Corrupted(format!("cannot open key {id}: {e}")))?;
    let raw = String::from_utf8(plaintext)
        .map_err(|e| StateError::Corrupted(format!("key {id} is not utf-8: {e}")))?;
    Ok(Zeroizing::new(raw))
}
