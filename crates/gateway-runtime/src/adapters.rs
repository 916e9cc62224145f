//! Collaborator stand-ins for running without an embedding application.

use async_trait::async_trait;
use wf_management::{MessageRetriever, RetrieveError};
use wf_protocol::WfMessage;

/// Retriever that resolves nothing.
///
/// Message retrieval is backed by the datastore and chain lookup of the
/// embedding application. Without one, every reference lookup misses and
/// appended initialisation vectors are parked on the queue instead, which
/// is the safe degradation.
#[derive(Default)]
pub struct UnresolvedRetriever;

impl UnresolvedRetriever {
    /// Create the retriever.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageRetriever for UnresolvedRetriever {
    async fn get_message(
        &self,
        _blockchain: &str,
        _transaction_hash: &str,
    ) -> Result<Option<WfMessage>, RetrieveError> {
        Ok(None)
    }
}
