//! ECDH key negotiation on secp256k1.

use k256::ecdh::diffie_hellman;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use zeroize::Zeroizing;

use crate::CryptoError;

/// An ECDH key pair on the chain curve.
///
/// The secret scalar is zeroised by `k256` when the pair is dropped.
pub struct EcdhKeyPair {
    secret: SecretKey,
}

impl EcdhKeyPair {
    /// Generate a fresh random key pair.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            secret: SecretKey::random(&mut rand::thread_rng()),
        }
    }

    /// Restore a key pair from the raw 32-octet secret.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidPrivateKey` for an out-of-range scalar.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let secret =
            SecretKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { secret })
    }

    /// Restore a key pair from a hex-encoded secret.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidHex` or `CryptoError::InvalidPrivateKey`.
    pub fn from_secret_hex(secret_hex: &str) -> Result<Self, CryptoError> {
        let mut bytes = Zeroizing::new(
            hex::decode(secret_hex).map_err(|e| CryptoError::InvalidHex(e.to_string()))?,
        );
        let pair = Self::from_secret_bytes(&bytes);
        bytes.fill(0);
        pair
    }

    /// The raw secret, hex encoded, for keystore custody.
    #[must_use]
    pub fn secret_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.secret.to_bytes()))
    }

    /// The compressed SEC1 public key, hex encoded.
    #[must_use]
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.secret.public_key().to_encoded_point(true).as_bytes())
    }

    /// Derive the shared secret with a peer's compressed public key.
    ///
    /// The secret is the x-coordinate of the shared point, 32 octets.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidPublicKey` for a malformed peer key.
    pub fn shared_secret(&self, peer_public_hex: &str) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let peer_bytes =
            hex::decode(peer_public_hex).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        let peer =
            PublicKey::from_sec1_bytes(&peer_bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        let shared = diffie_hellman(self.secret.to_nonzero_scalar(), peer.as_affine());
        Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
    }
}
