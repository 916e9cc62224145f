//! Outbound ports of the management plane.

use async_trait::async_trait;
use thiserror::Error;
use wf_protocol::WfMessage;

/// Retrieval failure for a stored message.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct RetrieveError(pub String);

/// Looks up previously seen messages by transaction hash.
///
/// Backed by the datastore and chain lookup outside this workspace; the
/// management plane only needs this narrow contract to resolve message
/// references.
#[async_trait]
pub trait MessageRetriever: Send + Sync {
    /// The decoded message carried by `transaction_hash`, if known.
    ///
    /// # Errors
    ///
    /// Returns `RetrieveError` when the lookup itself fails; an unknown
    /// hash is `Ok(None)`.
    async fn get_message(
        &self,
        blockchain: &str,
        transaction_hash: &str,
    ) -> Result<Option<WfMessage>, RetrieveError>;
}
