//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, Error)]
pub enum CryptoError {
    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption or authentication failed
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Requested derivation output length is out of range
    #[error("Invalid output length: {0}")]
    InvalidOutputLength(usize),

    /// A hex-encoded value could not be decoded
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Invalid signature format
    #[error("Invalid signature format")]
    InvalidSignature,

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,
}
