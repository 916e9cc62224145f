//! Message retriever test double.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use wf_protocol::WfMessage;

use crate::ports::{MessageRetriever, RetrieveError};

/// In-memory retriever for tests.
#[derive(Default)]
pub struct MockMessageRetriever {
    messages: Mutex<HashMap<String, WfMessage>>,
}

impl MockMessageRetriever {
    /// Create an empty retriever.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a message retrievable under its transaction hash.
    pub fn insert(&self, message: WfMessage) {
        self.messages
            .lock()
            .insert(message.meta_header.transaction_hash.clone(), message);
    }
}

#[async_trait]
impl MessageRetriever for MockMessageRetriever {
    async fn get_message(
        &self,
        _blockchain: &str,
        transaction_hash: &str,
    ) -> Result<Option<WfMessage>, RetrieveError> {
        Ok(self.messages.lock().get(transaction_hash).cloned())
    }
}
