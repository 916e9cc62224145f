//! State store error types.

use thiserror::Error;

/// State store failures.
///
/// Only [`StateError::Fatal`] aborts the gateway; every other variant is
/// reported and leaves the in-memory model intact.
#[derive(Debug, Clone, Error)]
pub enum StateError {
    /// Unrecoverable: bad master key, undecryptable or schema-invalid
    /// state at load.
    #[error("fatal state failure: {0}")]
    Fatal(String),

    /// A record is missing its envelope fields or fails authentication.
    #[error("corrupted state: {0}")]
    Corrupted(String),

    /// A referenced record does not exist.
    #[error("no such resource: {0}")]
    NoResource(String),

    /// The request is inconsistent or incomplete.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The operation would overwrite an existing record.
    #[error("resource conflict: {0}")]
    Conflict(String),

    /// The datastore could not be read or written.
    #[error("datastore failure: {0}")]
    Datastore(String),
}
