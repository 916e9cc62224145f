//! # wf-protocol
//!
//! The Whiteflag message model shared by every gateway subsystem.
//!
//! ## Role in System
//!
//! - **Wire shape**: typed `MetaHeader` / `MessageHeader` / `MessageBody`
//!   entities that round-trip the JSON representation of a Whiteflag message
//! - **Collaborator contracts**: the [`MessageCodec`] port through which the
//!   listener turns raw chain payloads into messages, and the chain-side
//!   block/transaction abstraction it consumes
//! - **Error taxonomy**: protocol invariant violations
//!   ([`ProtocolError`]) and domain-recoverable failures ([`ProcessingError`])
//!
//! The codec itself (message encoding/decoding) lives outside this workspace;
//! only its contract is defined here.

pub mod chain;
pub mod codec;
pub mod codes;
pub mod errors;
pub mod message;

pub use chain::{BlockElement, CallIndex, ChainBlock};
pub use codec::{CodecError, MessageCodec};
pub use codes::{CryptoDataType, MessageCode, ReferenceIndicator, VerificationMethod};
pub use errors::{ProcessingError, ProtocolError, ProtocolErrorKind};
pub use message::{MessageBody, MessageHeader, MetaHeader, TransceiveDirection, WfMessage};

/// Protocol prefix carried by every Whiteflag message.
pub const MESSAGE_PREFIX: &str = "WF";

/// Protocol version implemented by this gateway.
pub const PROTOCOL_VERSION: &str = "1";

/// Length in hex characters of a referenced transaction hash field.
pub const REFERENCED_MESSAGE_LEN: usize = 64;

/// The all-zero referenced message used by original (reference `0`) messages.
#[must_use]
pub fn zero_reference() -> String {
    "0".repeat(REFERENCED_MESSAGE_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_reference_length() {
        assert_eq!(zero_reference().len(), REFERENCED_MESSAGE_LEN);
    }
}
