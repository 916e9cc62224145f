//! AES-GCM authenticated encryption.
//!
//! Both envelope ciphers of the state store live here: AES-256-GCM for the
//! whole state blob and AES-128-GCM for individual key records. The IV is
//! 12 random octets and the 16-octet authentication tag is carried
//! separately from the ciphertext, matching the at-rest record shape.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, Nonce};
use rand::RngCore;

use crate::{CryptoError, GCM_IV_LEN, GCM_TAG_LEN};

/// Ciphertext with its detached IV and authentication tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    /// Random initialisation vector (12 octets).
    pub iv: [u8; GCM_IV_LEN],
    /// Authentication tag (16 octets).
    pub tag: [u8; GCM_TAG_LEN],
    /// Ciphertext without the tag.
    pub ciphertext: Vec<u8>,
}

fn random_iv() -> [u8; GCM_IV_LEN] {
    let mut iv = [0u8; GCM_IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);
    iv
}

fn split_tag(mut combined: Vec<u8>) -> Result<(Vec<u8>, [u8; GCM_TAG_LEN]), CryptoError> {
    if combined.len() < GCM_TAG_LEN {
        return Err(CryptoError::EncryptionFailed(
            "ciphertext shorter than tag".to_string(),
        ));
    }
    let tag_start = combined.len() - GCM_TAG_LEN;
    let tag_bytes = combined.split_off(tag_start);
    let mut tag = [0u8; GCM_TAG_LEN];
    tag.copy_from_slice(&tag_bytes);
    Ok((combined, tag))
}

/// Encrypt with AES-256-GCM under a 32-octet key.
///
/// # Errors
///
/// Returns `CryptoError::InvalidKeyLength` for a wrong-sized key and
/// `CryptoError::EncryptionFailed` when the cipher fails.
pub fn encrypt_aes256_gcm(key: &[u8], plaintext: &[u8]) -> Result<Sealed, CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
        expected: 32,
        actual: key.len(),
    })?;
    let iv = random_iv();
    let combined = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    let (ciphertext, tag) = split_tag(combined)?;
    Ok(Sealed {
        iv,
        tag,
        ciphertext,
    })
}

/// Decrypt AES-256-GCM output, authenticating the detached tag.
///
/// # Errors
///
/// Returns `CryptoError::DecryptionFailed` when authentication fails.
pub fn decrypt_aes256_gcm(
    key: &[u8],
    iv: &[u8],
    tag: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
        expected: 32,
        actual: key.len(),
    })?;
    decrypt_with(&cipher, iv, tag, ciphertext)
}

/// Encrypt with AES-128-GCM under a 16-octet key.
///
/// # Errors
///
/// Returns `CryptoError::InvalidKeyLength` for a wrong-sized key and
/// `CryptoError::EncryptionFailed` when the cipher fails.
pub fn encrypt_aes128_gcm(key: &[u8], plaintext: &[u8]) -> Result<Sealed, CryptoError> {
    let cipher = Aes128Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
        expected: 16,
        actual: key.len(),
    })?;
    let iv = random_iv();
    let combined = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    let (ciphertext, tag) = split_tag(combined)?;
    Ok(Sealed {
        iv,
        tag,
        ciphertext,
    })
}

/// Decrypt AES-128-GCM output, authenticating the detached tag.
///
/// # Errors
///
/// Returns `CryptoError::DecryptionFailed` when authentication fails.
pub fn decrypt_aes128_gcm(
    key: &[u8],
    iv: &[u8],
    tag: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes128Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
        expected: 16,
        actual: key.len(),
    })?;
    decrypt_with(&cipher, iv, tag, ciphertext)
}

fn decrypt_with<C: Aead>(
    cipher: &C,
    iv: &[u8],
    tag: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if iv.len() != GCM_IV_LEN {
        return Err(CryptoError::DecryptionFailed(format!(
            "iv must be {GCM_IV_LEN} octets, got {}",
            iv.len()
        )));
    }
    if tag.len() != GCM_TAG_LEN {
        return Err(CryptoError::DecryptionFailed(format!(
            "tag must be {GCM_TAG_LEN} octets, got {}",
            tag.len()
        )));
    }
    let mut combined = Vec::with_capacity(ciphertext.len() + tag.len());
    combined.extend_from_slice(ciphertext);
    combined.extend_from_slice(tag);
    cipher
        .decrypt(
            Nonce::from_slice(iv),
            Payload {
                msg: &combined,
                aad: &[],
            },
        )
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aes256_roundtrip() {
        let key = [0x42u8; 32];
        let sealed = encrypt_aes256_gcm(&key, b"state blob").unwrap();
        assert_eq!(sealed.iv.len(), 12);
        assert_eq!(sealed.tag.len(), 16);

        let plain =
            decrypt_aes256_gcm(&key, &sealed.iv, &sealed.tag, &sealed.ciphertext).unwrap();
        assert_eq!(plain, b"state blob");
    }

    #[test]
    fn test_aes128_roundtrip() {
        let key = [0x17u8; 16];
        let sealed = encrypt_aes128_gcm(&key, b"a0b1c2d3").unwrap();
        let plain =
            decrypt_aes128_gcm(&key, &sealed.iv, &sealed.tag, &sealed.ciphertext).unwrap();
        assert_eq!(plain, b"a0b1c2d3");
    }

    #[test]
    fn test_tampered_tag_fails() {
        let key = [0x42u8; 32];
        let mut sealed = encrypt_aes256_gcm(&key, b"secret").unwrap();
        sealed.tag[0] ^= 0xFF;
        let result = decrypt_aes256_gcm(&key, &sealed.iv, &sealed.tag, &sealed.ciphertext);
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = encrypt_aes256_gcm(&[1u8; 32], b"secret").unwrap();
        let result =
            decrypt_aes256_gcm(&[2u8; 32], &sealed.iv, &sealed.tag, &sealed.ciphertext);
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_key_length_rejected() {
        assert!(matches!(
            encrypt_aes256_gcm(&[0u8; 16], b""),
            Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 16
            })
        ));
        assert!(matches!(
            encrypt_aes128_gcm(&[0u8; 32], b""),
            Err(CryptoError::InvalidKeyLength {
                expected: 16,
                actual: 32
            })
        ));
    }
}
