//! Message codec contract.
//!
//! Encoding and decoding of the Whiteflag binary format is an external
//! collaborator; the gateway core only depends on this extraction contract.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::chain::BlockElement;
use crate::message::WfMessage;

/// Extraction failures.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// The payload does not contain a Whiteflag message. Not an error
    /// condition for the listener; almost every transaction on a public
    /// chain is unrelated traffic.
    #[error("no whiteflag message in payload")]
    NoData,

    /// The payload starts like a Whiteflag message but cannot be decoded.
    #[error("malformed whiteflag message: {0}")]
    Malformed(String),
}

impl CodecError {
    /// Whether the failure only means "not a protocol message".
    #[must_use]
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

/// Decodes Whiteflag messages out of chain transactions and extrinsics.
pub trait MessageCodec: Send + Sync {
    /// Extract and decode the message carried by `element`, filling the
    /// meta header from the element and block context.
    ///
    /// # Errors
    ///
    /// [`CodecError::NoData`] when the element carries no Whiteflag message;
    /// [`CodecError::Malformed`] when it carries one that cannot be decoded.
    fn extract_message(
        &self,
        element: &BlockElement,
        block_number: u64,
        block_time: Option<DateTime<Utc>>,
    ) -> Result<WfMessage, CodecError>;
}
