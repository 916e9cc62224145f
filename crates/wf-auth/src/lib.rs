//! # wf-auth
//!
//! The authentication plane: establishes and retracts the link between an
//! originator identity and a blockchain address.
//!
//! ## Methods
//!
//! - **Method 1, digital signature**: the originator publishes a flattened
//!   JSON Web Signature at an HTTPS URL and announces that URL in an `A`
//!   message; the gateway fetches it, verifies it against the originator's
//!   chain public key and asserts the signed claims.
//! - **Method 2, shared token**: the `A` message carries a value derived
//!   from a pre-shared secret and the originator's binary address; the
//!   gateway derives the same value from every known token until one
//!   matches.
//!
//! A successful verification upserts the originator record; any failure
//! marks the originator invalid. Recall and discontinue messages retract
//! previously recorded authentication messages.

pub mod adapters;
pub mod config;
pub mod errors;
pub mod jws;
pub mod ports;
pub mod service;

pub use adapters::{HttpSignatureFetcher, MockSignatureFetcher};
pub use config::AuthConfig;
pub use errors::AuthError;
pub use jws::{FlatJws, SignaturePayload};
pub use ports::{FetchError, SignatureFetcher};
pub use service::{
    binary_address, AuthVerdict, AuthenticationService, SignRequest, SignedSignature,
};
