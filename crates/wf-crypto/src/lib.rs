//! # wf-crypto
//!
//! Cryptographic primitives for the Whiteflag gateway.
//!
//! ## Contents
//!
//! - **HKDF** (RFC 5869, SHA-256) for every key derivation in the gateway
//! - **SHA-256 hashing** and the truncated 12-octet key identifiers used by
//!   the keystore
//! - **AES-GCM** in the two widths used for envelope encryption (256-bit for
//!   the state blob, 128-bit for individual keys)
//! - **ECDH and ECDSA** on secp256k1
//! - **Authentication token derivation** for the shared-token method
//!
//! ## Security
//!
//! Input key material handed to [`hkdf`] is zeroised after the extract step;
//! every secret wrapper in this crate zeroises on drop. Callers that hold raw
//! secret buffers of their own are expected to pass them through [`zeroise`]
//! at the edge of use.

pub mod aead;
pub mod ecdh;
pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod kdf;
pub mod token;

pub use aead::{decrypt_aes128_gcm, decrypt_aes256_gcm, encrypt_aes128_gcm, encrypt_aes256_gcm};
pub use ecdh::EcdhKeyPair;
pub use errors::CryptoError;
pub use hashing::{hash, hash_hex, key_id};
pub use kdf::hkdf;
pub use token::{derive_auth_token, derive_auth_token_hex};

use zeroize::Zeroize;

/// GCM authentication tag size in bytes.
pub const GCM_TAG_LEN: usize = 16;

/// GCM initialisation vector size in bytes.
pub const GCM_IV_LEN: usize = 12;

/// Keystore identifier size in octets (24 hex characters).
pub const KEY_ID_LEN: usize = 12;

/// Overwrite a buffer with zeros.
///
/// Uses a compiler fence through the `zeroize` crate so the wipe cannot be
/// optimised away.
pub fn zeroise(buffer: &mut [u8]) -> &mut [u8] {
    buffer.zeroize();
    buffer
}
