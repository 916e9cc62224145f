//! ECDSA signatures on secp256k1 (ES256K).
//!
//! RFC 6979 deterministic nonces; SHA-256 message digest. Used for signing
//! and verifying the JSON Web Signatures of the authentication plane.

use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use zeroize::Zeroizing;

use crate::CryptoError;

/// Sign a message with a raw 32-octet secret key; returns `r || s` (64 octets).
///
/// # Errors
///
/// Returns `CryptoError::InvalidPrivateKey` for an out-of-range scalar.
pub fn sign(secret: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let signing_key =
        SigningKey::from_slice(secret).map_err(|_| CryptoError::InvalidPrivateKey)?;
    let signature: Signature = signing_key.sign(message);
    Ok(signature.to_bytes().to_vec())
}

/// Sign with a hex-encoded secret key, wiping the decoded copy afterwards.
///
/// # Errors
///
/// Returns `CryptoError::InvalidHex` or `CryptoError::InvalidPrivateKey`.
pub fn sign_with_hex_key(secret_hex: &str, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let secret = Zeroizing::new(
        hex::decode(secret_hex).map_err(|e| CryptoError::InvalidHex(e.to_string()))?,
    );
    sign(&secret, message)
}

/// Verify an `r || s` signature against a SEC1 public key.
///
/// # Errors
///
/// Returns `CryptoError::SignatureVerificationFailed` when the signature
/// does not match, or a format error for malformed inputs.
pub fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
    let verifying_key =
        VerifyingKey::from_sec1_bytes(public_key).map_err(|_| CryptoError::InvalidPublicKey)?;
    let signature =
        Signature::from_slice(signature).map_err(|_| CryptoError::InvalidSignature)?;
    verifying_key
        .verify(message, &signature)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}

/// The compressed SEC1 public key for a raw secret key, hex encoded.
///
/// # Errors
///
/// Returns `CryptoError::InvalidPrivateKey` for an out-of-range scalar.
pub fn public_key_hex(secret: &[u8]) -> Result<String, CryptoError> {
    let signing_key =
        SigningKey::from_slice(secret).map_err(|_| CryptoError::InvalidPrivateKey)?;
    let sec1 = signing_key.verifying_key().to_sec1_bytes();
    Ok(hex::encode(sec1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let secret = [0x5Au8; 32];
        let message = b"published authentication payload";

        let signature = sign(&secret, message).unwrap();
        let public = hex::decode(public_key_hex(&secret).unwrap()).unwrap();

        assert!(verify(&public, message, &signature).is_ok());
        assert!(verify(&public, b"different message", &signature).is_err());
    }

    #[test]
    fn test_deterministic_signatures() {
        let secret = [0x5Au8; 32];
        let s1 = sign(&secret, b"same message").unwrap();
        let s2 = sign(&secret, b"same message").unwrap();
        assert_eq!(s1, s2);
        assert_eq!(s1.len(), 64);
    }

    #[test]
    fn test_hex_key_signing() {
        let secret_hex = hex::encode([0x5Au8; 32]);
        let direct = sign(&[0x5Au8; 32], b"m").unwrap();
        let via_hex = sign_with_hex_key(&secret_hex, b"m").unwrap();
        assert_eq!(direct, via_hex);
    }

    #[test]
    fn test_invalid_key_material() {
        assert!(sign(&[0u8; 32], b"m").is_err()); // zero scalar out of range
        assert!(sign_with_hex_key("not-hex", b"m").is_err());
        assert!(verify(&[0x02, 0x01], b"m", &[0u8; 64]).is_err());
    }
}
