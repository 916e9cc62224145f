//! In-memory chain node and fixture codec.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use wf_protocol::{
    BlockElement, ChainBlock, CodecError, MessageCodec, TransceiveDirection, WfMessage,
};

use crate::ports::{ChainRpc, RpcError};

/// In-memory chain node for tests.
#[derive(Default)]
pub struct MockChainRpc {
    highest: AtomicU64,
    blocks: Mutex<BTreeMap<u64, ChainBlock>>,
    failures_left: AtomicU32,
    block_failures_left: AtomicU32,
    sent: Mutex<Vec<String>>,
}

impl MockChainRpc {
    /// Create an empty node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block and raise the head to its number.
    pub fn push_block(&self, block: ChainBlock) {
        self.highest.fetch_max(block.number, Ordering::SeqCst);
        self.blocks.lock().insert(block.number, block);
    }

    /// Append `count` empty blocks after the current head.
    pub fn push_empty_blocks(&self, count: u64) {
        let head = self.highest.load(Ordering::SeqCst);
        for number in head + 1..=head + count {
            self.push_block(ChainBlock {
                number,
                hash: format!("0xblock{number}"),
                ..ChainBlock::default()
            });
        }
    }

    /// Fail the next `count` calls with a node error.
    pub fn fail_next(&self, count: u32) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    /// Fail the next `count` block fetches only; head queries stay up.
    pub fn fail_block_fetches(&self, count: u32) {
        self.block_failures_left.store(count, Ordering::SeqCst);
    }

    /// Raw transactions submitted through this node.
    #[must_use]
    pub fn sent_transactions(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    fn maybe_fail(&self) -> Result<(), RpcError> {
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(RpcError::Node("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainRpc for MockChainRpc {
    async fn get_highest_block(&self) -> Result<u64, RpcError> {
        self.maybe_fail()?;
        Ok(self.highest.load(Ordering::SeqCst))
    }

    async fn get_block_by_number(
        &self,
        number: u64,
        _include_transactions: bool,
    ) -> Result<ChainBlock, RpcError> {
        self.maybe_fail()?;
        let block_left = self.block_failures_left.load(Ordering::SeqCst);
        if block_left > 0 {
            self.block_failures_left.store(block_left - 1, Ordering::SeqCst);
            return Err(RpcError::Node("injected block fetch failure".to_string()));
        }
        self.blocks
            .lock()
            .get(&number)
            .cloned()
            .ok_or_else(|| RpcError::NotFound(format!("block {number}")))
    }

    async fn send_raw_transaction(&self, raw: &str) -> Result<String, RpcError> {
        self.maybe_fail()?;
        self.sent.lock().push(raw.to_string());
        Ok(format!("0xtx{}", self.sent.lock().len()))
    }

    async fn get_raw_transaction(&self, hash: &str) -> Result<BlockElement, RpcError> {
        self.maybe_fail()?;
        let blocks = self.blocks.lock();
        blocks
            .values()
            .flat_map(|b| b.elements.iter())
            .find(|e| e.hash == hash)
            .cloned()
            .ok_or_else(|| RpcError::NotFound(format!("transaction {hash}")))
    }
}

/// Fixture codec: treats a payload object with a `message` field as an
/// embedded Whiteflag message.
pub struct FixtureCodec {
    blockchain: String,
}

impl FixtureCodec {
    /// Create a codec stamping messages with the given chain name.
    #[must_use]
    pub fn new(blockchain: &str) -> Self {
        Self {
            blockchain: blockchain.to_string(),
        }
    }

    /// Wrap a message into an element the codec will extract again.
    #[must_use]
    pub fn element_for(message: &WfMessage, hash: &str) -> BlockElement {
        BlockElement {
            hash: hash.to_string(),
            payload: serde_json::json!({ "message": message }),
            ..BlockElement::default()
        }
    }
}

impl MessageCodec for FixtureCodec {
    fn extract_message(
        &self,
        element: &BlockElement,
        block_number: u64,
        block_time: Option<DateTime<Utc>>,
    ) -> Result<WfMessage, CodecError> {
        let Some(embedded) = element.payload.get("message") else {
            return Err(CodecError::NoData);
        };
        let mut message: WfMessage = serde_json::from_value(embedded.clone())
            .map_err(|e| CodecError::Malformed(e.to_string()))?;

        message.meta_header.blockchain = self.blockchain.clone();
        message.meta_header.transaction_hash = element.hash.clone();
        message.meta_header.block_number = Some(block_number);
        message.meta_header.transceive_direction = Some(TransceiveDirection::Rx);
        if let Some(time) = block_time {
            message.meta_header.transaction_time =
                time.to_rfc3339_opts(SecondsFormat::Millis, true);
        }
        if !element.from_address.is_empty() {
            message.meta_header.originator_address = element.from_address.clone();
        }
        if !element.pub_key.is_empty() {
            message.meta_header.originator_pub_key = element.pub_key.clone();
        }
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_blocks_and_failures() {
        let rpc = MockChainRpc::new();
        rpc.push_empty_blocks(3);
        assert_eq!(rpc.get_highest_block().await.unwrap(), 3);

        rpc.fail_next(1);
        assert!(rpc.get_highest_block().await.is_err());
        assert!(rpc.get_highest_block().await.is_ok());

        let block = rpc.get_block_by_number(2, true).await.unwrap();
        assert_eq!(block.hash, "0xblock2");
        assert!(rpc.get_block_by_number(9, true).await.is_err());
    }

    #[test]
    fn test_fixture_codec_roundtrip() {
        let codec = FixtureCodec::new("blockchain-test");
        let message = WfMessage::default();
        let element = FixtureCodec::element_for(&message, "0xabc");

        let extracted = codec.extract_message(&element, 7, None).unwrap();
        assert_eq!(extracted.meta_header.blockchain, "blockchain-test");
        assert_eq!(extracted.meta_header.transaction_hash, "0xabc");
        assert_eq!(extracted.meta_header.block_number, Some(7));
    }

    #[test]
    fn test_fixture_codec_no_data() {
        let codec = FixtureCodec::new("blockchain-test");
        let element = BlockElement::default();
        let result = codec.extract_message(&element, 1, None);
        assert!(matches!(result, Err(CodecError::NoData)));
    }
}
