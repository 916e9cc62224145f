//! Chain-side block and transaction abstraction consumed by the codec.
//!
//! Account-based chains expose transactions with a data payload; Substrate
//! style chains expose extrinsics addressed by pallet/call. Both are folded
//! into [`BlockElement`] so the listener and codec stay chain-agnostic.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pallet/call address of an extrinsic, e.g. `timestamp.set`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallIndex {
    /// Pallet (module) name.
    pub section: String,
    /// Call (method) name.
    pub method: String,
}

impl CallIndex {
    /// Build a call index from section and method names.
    #[must_use]
    pub fn new(section: &str, method: &str) -> Self {
        Self {
            section: section.to_string(),
            method: method.to_string(),
        }
    }

    /// Whether this is the `timestamp.set` inherent carrying the block time.
    #[must_use]
    pub fn is_timestamp(&self) -> bool {
        self.section == "timestamp" && self.method == "set"
    }

    /// Whether this is a `signal.sendSignal` call carrying a Whiteflag payload.
    #[must_use]
    pub fn is_signal(&self) -> bool {
        self.section == "signal" && self.method == "sendSignal"
    }
}

/// One transaction or extrinsic of a retrieved block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockElement {
    /// Transaction or extrinsic hash.
    pub hash: String,

    /// Sending address, when known.
    pub from_address: String,

    /// Recipient address, when present.
    pub to_address: String,

    /// Sender public key, when the chain exposes it.
    pub pub_key: String,

    /// Pallet/call address for extrinsics; absent for plain transactions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call: Option<CallIndex>,

    /// Raw data payload (hex) or call arguments.
    pub payload: Value,
}

impl BlockElement {
    /// Whether the element can carry a Whiteflag message at all.
    ///
    /// Plain transactions always qualify; extrinsics only through the
    /// signal pallet.
    #[must_use]
    pub fn is_candidate(&self) -> bool {
        match &self.call {
            Some(call) => call.is_signal(),
            None => true,
        }
    }
}

/// A retrieved block with its transactions or extrinsics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChainBlock {
    /// Block number.
    pub number: u64,

    /// Block hash.
    pub hash: String,

    /// Unix timestamp in milliseconds, when the chain carries one directly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_millis: Option<u64>,

    /// Transactions or extrinsics of the block.
    pub elements: Vec<BlockElement>,
}

impl ChainBlock {
    /// Block time in unix milliseconds.
    ///
    /// Prefers the block's own timestamp; falls back to a `timestamp.set`
    /// inherent among the elements.
    #[must_use]
    pub fn block_time_millis(&self) -> Option<u64> {
        if self.timestamp_millis.is_some() {
            return self.timestamp_millis;
        }
        self.elements
            .iter()
            .find(|e| e.call.as_ref().is_some_and(CallIndex::is_timestamp))
            .and_then(|e| e.payload.as_u64().or_else(|| e.payload.as_str()?.parse().ok()))
    }
}
