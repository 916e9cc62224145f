//! Operation error types.

use thiserror::Error;
use wf_protocol::ProcessingError;
use wf_state::StateError;

/// Operator surface failures.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Domain-recoverable failure, reported to the caller.
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    /// State custody failed underneath the operation.
    #[error(transparent)]
    State(#[from] StateError),
}
