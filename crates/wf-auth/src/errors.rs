//! Authentication error types.

use thiserror::Error;
use wf_protocol::ProtocolError;
use wf_state::StateError;

/// Authentication plane failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A protocol invariant was violated (`WF_AUTH_ERROR`,
    /// `WF_SIGN_ERROR`), with all contributing causes.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The published signature could not be retrieved.
    #[error("signature retrieval failed: {0}")]
    Retrieval(String),

    /// The message cannot be handled by this plane at all.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// State custody failed underneath the verification.
    #[error(transparent)]
    State(#[from] StateError),
}
