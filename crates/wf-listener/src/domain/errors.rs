//! Listener error types.

use thiserror::Error;
use wf_state::StateError;

/// Block listener failures.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// RPC or network failure; retried per batch.
    #[error("transient chain failure: {0}")]
    Transient(String),

    /// A payload looked like a Whiteflag message but could not be decoded.
    #[error("codec failure: {0}")]
    Codec(String),

    /// State persistence failed underneath the listener.
    #[error(transparent)]
    State(#[from] StateError),
}

impl ListenerError {
    /// Whether the failure is worth retrying the batch for.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Codec(_))
    }
}
