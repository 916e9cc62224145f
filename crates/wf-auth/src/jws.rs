//! Flattened JSON Web Signatures over secp256k1 (ES256K).
//!
//! The published authentication signature is the flattened serialisation
//! `{protected, payload, signature}` with base64url-encoded parts and the
//! signature computed over `protected || '.' || payload`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wf_crypto::ecdsa;
use wf_protocol::{ProtocolError, ProtocolErrorKind};

use crate::errors::AuthError;

/// The JWS algorithm used on the chain curve.
pub const JWS_ALGORITHM: &str = "ES256K";

/// A flattened JWS as published at the originator's URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatJws {
    /// base64url of the protected header JSON.
    pub protected: String,
    /// base64url of the payload JSON.
    pub payload: String,
    /// base64url of the raw `r || s` signature.
    pub signature: String,
}

/// The signed claims binding an identity to an address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignaturePayload {
    /// Blockchain address of the originator.
    pub addr: String,
    /// Organisation name.
    pub orgname: String,
    /// URL the signature is published at.
    pub url: String,
    /// Additional claims, carried as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize)]
struct ProtectedHeader {
    alg: String,
}

fn signing_input(protected: &str, payload: &str) -> String {
    format!("{protected}.{payload}")
}

/// Create a flattened JWS over the payload with a hex-encoded secret key.
///
/// # Errors
///
/// Returns `WF_SIGN_ERROR` when the payload cannot be serialised or the
/// key material is unusable.
pub fn create(payload: &SignaturePayload, secret_hex: &str) -> Result<FlatJws, AuthError> {
    let header_json = serde_json::to_string(&ProtectedHeader {
        alg: JWS_ALGORITHM.to_string(),
    })
    .map_err(|e| sign_error(format!("cannot serialise protected header: {e}")))?;
    let payload_json = serde_json::to_string(payload)
        .map_err(|e| sign_error(format!("cannot serialise payload: {e}")))?;

    let protected = URL_SAFE_NO_PAD.encode(header_json);
    let encoded_payload = URL_SAFE_NO_PAD.encode(payload_json);

    let signature = ecdsa::sign_with_hex_key(
        secret_hex,
        signing_input(&protected, &encoded_payload).as_bytes(),
    )
    .map_err(|e| sign_error(format!("signing failed: {e}")))?;

    Ok(FlatJws {
        protected,
        payload: encoded_payload,
        signature: URL_SAFE_NO_PAD.encode(signature),
    })
}

/// Verify a flattened JWS against a hex-encoded SEC1 public key and return
/// the signed claims.
///
/// # Errors
///
/// Returns `WF_AUTH_ERROR` for a malformed serialisation, an unexpected
/// algorithm or a failing signature.
pub fn verify(jws: &FlatJws, public_key_hex: &str) -> Result<SignaturePayload, AuthError> {
    let header_json = URL_SAFE_NO_PAD
        .decode(&jws.protected)
        .map_err(|e| auth_error(format!("protected header is not base64url: {e}")))?;
    let header: ProtectedHeader = serde_json::from_slice(&header_json)
        .map_err(|e| auth_error(format!("protected header is not valid JSON: {e}")))?;
    if header.alg != JWS_ALGORITHM {
        return Err(auth_error(format!(
            "unexpected JWS algorithm {}, expected {JWS_ALGORITHM}",
            header.alg
        )));
    }

    let public_key = hex::decode(public_key_hex)
        .map_err(|e| auth_error(format!("originator public key is not hex: {e}")))?;
    let signature = URL_SAFE_NO_PAD
        .decode(&jws.signature)
        .map_err(|e| auth_error(format!("signature is not base64url: {e}")))?;

    ecdsa::verify(
        &public_key,
        signing_input(&jws.protected, &jws.payload).as_bytes(),
        &signature,
    )
    .map_err(|e| auth_error(format!("signature verification failed: {e}")))?;

    decode_payload(jws)
}

/// Decode the payload claims without verifying the signature.
///
/// # Errors
///
/// Returns `WF_AUTH_ERROR` for a malformed payload part.
pub fn decode_payload(jws: &FlatJws) -> Result<SignaturePayload, AuthError> {
    let payload_json = URL_SAFE_NO_PAD
        .decode(&jws.payload)
        .map_err(|e| auth_error(format!("payload is not base64url: {e}")))?;
    serde_json::from_slice(&payload_json)
        .map_err(|e| auth_error(format!("payload is not valid JSON: {e}")))
}

fn auth_error(cause: String) -> AuthError {
    AuthError::Protocol(ProtocolError::single(
        ProtocolErrorKind::AuthenticationError,
        cause,
    ))
}

fn sign_error(cause: String) -> AuthError {
    AuthError::Protocol(ProtocolError::single(
        ProtocolErrorKind::SignatureError,
        cause,
    ))
}
