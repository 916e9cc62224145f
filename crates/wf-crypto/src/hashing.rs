//! SHA-256 hashing and keystore identifier derivation.

use sha2::{Digest, Sha256};

use crate::KEY_ID_LEN;

/// SHA-256 hash output (256-bit).
pub type Hash = [u8; 32];

/// Hash data with SHA-256 (one-shot).
#[must_use]
pub fn hash(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hexadecimal SHA-256 hash, optionally truncated to `length` octets.
///
/// A truncation of `n` octets yields `2n` hex characters.
#[must_use]
pub fn hash_hex(data: &[u8], length: Option<usize>) -> String {
    let digest = hash(data);
    let take = length.unwrap_or(digest.len()).min(digest.len());
    hex::encode(&digest[..take])
}

/// Keystore identifier: 12-octet truncated SHA-256 over concatenated parts.
///
/// Every key in the state store is addressed this way, e.g.
/// `key_id(&[chain, address])` for a blockchain signing key.
#[must_use]
pub fn key_id(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    let digest: Hash = hasher.finalize().into();
    hex::encode(&digest[..KEY_ID_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        assert_eq!(hash(b"test"), hash(b"test"));
        assert_ne!(hash(b"test"), hash(b"Test"));
    }

    #[test]
    fn test_known_vector() {
        // SHA-256 of the empty string.
        assert_eq!(
            hash_hex(b"", None),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_truncation() {
        let full = hash_hex(b"whiteflag", None);
        let truncated = hash_hex(b"whiteflag", Some(12));
        assert_eq!(truncated.len(), 24);
        assert!(full.starts_with(&truncated));
    }

    #[test]
    fn test_key_id_concatenation() {
        // The id over parts equals the truncated hash of their concatenation.
        let id = key_id(&["blockchain-test", "0xabcdef"]);
        assert_eq!(id, hash_hex(b"blockchain-test0xabcdef", Some(12)));
        assert_eq!(id.len(), 24);
    }
}
