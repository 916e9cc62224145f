//! Management plane error types.

use thiserror::Error;
use wf_auth::AuthError;
use wf_state::StateError;

/// Management plane failures.
///
/// All of these are domain-recoverable: the plane logs them and keeps
/// consuming events.
#[derive(Debug, Error)]
pub enum ManagementError {
    /// State custody failed underneath a handler.
    #[error(transparent)]
    State(#[from] StateError),

    /// Authentication handling failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A referenced message could not be retrieved.
    #[error("message retrieval failed: {0}")]
    Retrieve(String),

    /// The message lacks a field this handler needs.
    #[error("bad message: {0}")]
    BadMessage(String),

    /// Cryptographic material could not be used.
    #[error("crypto failure: {0}")]
    Crypto(String),
}
