//! Shared authentication token derivation.
//!
//! The shared-token method authenticates an originator by deriving a
//! verification value from a pre-shared secret and the originator's binary
//! blockchain address, then comparing it with the `VerificationData` field
//! of the received `A` message.

use zeroize::Zeroizing;

use crate::{kdf, CryptoError};

/// Length of a derived token verification value in octets.
pub const TOKEN_LEN: usize = 32;

/// Derive the verification data for a shared authentication token.
///
/// HKDF with `ikm = secret`, `info = address`, the RFC 5869 default salt
/// and a 32-octet output. The caller's secret buffer is zeroised by the
/// derivation.
///
/// # Errors
///
/// Propagates derivation failures from the crypto layer.
pub fn derive_auth_token(
    secret: &mut [u8],
    address: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let okm = kdf::hkdf(secret, &[], address, TOKEN_LEN)?;
    Ok(Zeroizing::new(okm))
}

/// Derive the verification data as a lowercase hex string.
///
/// # Errors
///
/// Propagates derivation failures from the crypto layer.
pub fn derive_auth_token_hex(
    secret: &mut [u8],
    address: &[u8],
) -> Result<Zeroizing<String>, CryptoError> {
    let token = derive_auth_token(secret, address)?;
    Ok(Zeroizing::new(hex::encode(token.as_slice())))
}
