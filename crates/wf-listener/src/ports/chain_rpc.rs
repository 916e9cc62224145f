//! Chain RPC abstraction.
//!
//! The wire client behind this port (JSON-RPC over HTTP, WebSocket
//! subscriptions, light client) is a collaborator outside this workspace.

use async_trait::async_trait;
use thiserror::Error;
use wf_protocol::{BlockElement, ChainBlock};

/// Chain-side RPC failures.
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    /// The node could not be reached or rejected the call.
    #[error("node failure: {0}")]
    Node(String),

    /// The requested block or transaction does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Read and submit access to one chain node.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// The highest block number known to the node.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Node` on node failure.
    async fn get_highest_block(&self) -> Result<u64, RpcError>;

    /// Retrieve one block, with full transactions when requested.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::NotFound` for a missing block.
    async fn get_block_by_number(
        &self,
        number: u64,
        include_transactions: bool,
    ) -> Result<ChainBlock, RpcError>;

    /// Submit a raw signed transaction; returns its hash.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Node` when the node rejects the transaction.
    async fn send_raw_transaction(&self, raw: &str) -> Result<String, RpcError>;

    /// Retrieve one transaction by hash.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::NotFound` for an unknown hash.
    async fn get_raw_transaction(&self, hash: &str) -> Result<BlockElement, RpcError>;
}
