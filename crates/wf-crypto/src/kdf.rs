//! HKDF key derivation (RFC 5869, SHA-256).

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::CryptoError;

/// Maximum HKDF output for SHA-256: 255 blocks of the hash length.
pub const MAX_OUTPUT_LEN: usize = 255 * 32;

/// Derive `length` octets of key material from `ikm`.
///
/// HMAC-SHA-256 extract with `salt`, then counter-indexed expand with
/// `info`. The input key material is zeroised once the extract step has
/// consumed it; callers should not rely on `ikm` afterwards.
///
/// # Errors
///
/// Returns `CryptoError::InvalidOutputLength` when `length` is zero or
/// exceeds [`MAX_OUTPUT_LEN`].
pub fn hkdf(
    ikm: &mut [u8],
    salt: &[u8],
    info: &[u8],
    length: usize,
) -> Result<Vec<u8>, CryptoError> {
    if length == 0 || length > MAX_OUTPUT_LEN {
        return Err(CryptoError::InvalidOutputLength(length));
    }

    let salt = if salt.is_empty() { None } else { Some(salt) };
    let hk = Hkdf::<Sha256>::new(salt, ikm);
    ikm.zeroize();

    let mut okm = vec![0u8; length];
    hk.expand(info, &mut okm)
        .map_err(|_| CryptoError::InvalidOutputLength(length))?;
    Ok(okm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc5869_case_1() {
        // RFC 5869 Appendix A.1 test vector.
        let mut ikm = vec![0x0bu8; 22];
        let salt: Vec<u8> = (0x00..=0x0c).collect();
        let info: Vec<u8> = (0xf0..=0xf9).collect();

        let okm = hkdf(&mut ikm, &salt, &info, 42).unwrap();
        assert_eq!(
            hex::encode(&okm),
            "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf\
             34007208d5b887185865"
        );
    }

    #[test]
    fn test_ikm_zeroised() {
        let mut ikm = vec![0xAAu8; 32];
        hkdf(&mut ikm, b"salt", b"info", 32).unwrap();
        assert!(ikm.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_deterministic() {
        let a = hkdf(&mut [1u8; 16], b"s", b"i", 64).unwrap();
        let b = hkdf(&mut [1u8; 16], b"s", b"i", 64).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_length_bounds() {
        assert!(hkdf(&mut [1u8; 16], b"", b"", 0).is_err());
        assert!(hkdf(&mut [1u8; 16], b"", b"", MAX_OUTPUT_LEN + 1).is_err());
        assert!(hkdf(&mut [1u8; 16], b"", b"", MAX_OUTPUT_LEN).is_ok());
    }

    #[test]
    fn test_empty_salt_is_rfc_default() {
        // RFC 5869: an absent salt equals HashLen zero bytes.
        let explicit = hkdf(&mut [7u8; 16], &[0u8; 32], b"ctx", 32).unwrap();
        let defaulted = hkdf(&mut [7u8; 16], b"", b"ctx", 32).unwrap();
        assert_eq!(explicit, defaulted);
    }
}
