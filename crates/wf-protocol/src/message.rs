//! Typed representation of a Whiteflag message.
//!
//! The JSON shape mirrors the canonical API representation: a `MetaHeader`
//! with transport metadata (camelCase fields), a `MessageHeader` with the
//! protocol header fields and a type-dependent `MessageBody` (both with
//! capitalised field names as defined by the protocol).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codes::{CryptoDataType, MessageCode, ReferenceIndicator, VerificationMethod};
use crate::{zero_reference, MESSAGE_PREFIX, PROTOCOL_VERSION};

/// Direction in which a message crossed this gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransceiveDirection {
    /// Received from a blockchain.
    #[serde(rename = "RX")]
    Rx,
    /// Sent by this gateway.
    #[serde(rename = "TX")]
    Tx,
}

/// Transport metadata attached to a message by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaHeader {
    /// Blockchain the message was observed on or is destined for.
    pub blockchain: String,

    /// Hash of the transaction that carried the message.
    pub transaction_hash: String,

    /// Address of the account that sent the transaction.
    pub originator_address: String,

    /// Public key of the originating account, when the chain exposes it.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub originator_pub_key: String,

    /// Recipient address, for directed messages.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub recipient_address: String,

    /// Whether this gateway received or sent the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transceive_direction: Option<TransceiveDirection>,

    /// Initialisation vector paired with an encrypted message, hex encoded.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub encryption_init_vector: String,

    /// Block the carrying transaction was included in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,

    /// Block time of the carrying transaction, ISO 8601.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub transaction_time: String,
}

/// Protocol header fields common to all message types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageHeader {
    /// Protocol prefix, always `WF`.
    pub prefix: String,

    /// Protocol version.
    pub version: String,

    /// `0` for plaintext, `1`/`2` for the two encryption methods.
    pub encryption_indicator: char,

    /// `1` when the originator signals duress.
    pub duress_indicator: char,

    /// Message type code.
    pub message_code: char,

    /// Relation to the referenced message.
    pub reference_indicator: char,

    /// Transaction hash of the referenced message, or all zeros.
    pub referenced_message: String,
}

impl Default for MessageHeader {
    fn default() -> Self {
        Self {
            prefix: MESSAGE_PREFIX.to_string(),
            version: PROTOCOL_VERSION.to_string(),
            encryption_indicator: '0',
            duress_indicator: '0',
            message_code: 'T',
            reference_indicator: '0',
            referenced_message: zero_reference(),
        }
    }
}

/// Type-dependent message body.
///
/// Only the bodies the gateway core inspects are typed; every other message
/// type passes through as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageBody {
    /// Body of an `A` (authentication) message.
    #[serde(rename_all = "PascalCase")]
    Authentication {
        /// Authentication method, `1` (signature) or `2` (token).
        verification_method: String,
        /// URL of the published signature, or the derived token value.
        verification_data: String,
    },

    /// Body of a `K` (cryptographic support) message.
    #[serde(rename_all = "PascalCase")]
    Crypto {
        /// Content type of the crypto data field.
        crypto_data_type: String,
        /// Hex-encoded cryptographic payload.
        crypto_data: String,
    },

    /// Any other message body, passed through untyped.
    Other(Value),
}

impl Default for MessageBody {
    fn default() -> Self {
        Self::Other(Value::Null)
    }
}

/// A complete Whiteflag message as handled by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WfMessage {
    /// Transport metadata.
    #[serde(rename = "MetaHeader", default)]
    pub meta_header: MetaHeader,

    /// Protocol header.
    #[serde(rename = "MessageHeader", default)]
    pub message_header: MessageHeader,

    /// Type-dependent body.
    #[serde(rename = "MessageBody", default)]
    pub message_body: MessageBody,
}

impl WfMessage {
    /// Build an authentication message body around a header and metadata.
    #[must_use]
    pub fn authentication(
        blockchain: &str,
        originator_address: &str,
        method: VerificationMethod,
        verification_data: &str,
    ) -> Self {
        Self {
            meta_header: MetaHeader {
                blockchain: blockchain.to_string(),
                originator_address: originator_address.to_string(),
                ..MetaHeader::default()
            },
            message_header: MessageHeader {
                message_code: 'A',
                ..MessageHeader::default()
            },
            message_body: MessageBody::Authentication {
                verification_method: match method {
                    VerificationMethod::Signature => "1".to_string(),
                    VerificationMethod::Token => "2".to_string(),
                },
                verification_data: verification_data.to_string(),
            },
        }
    }

    /// Build a cryptographic support message.
    #[must_use]
    pub fn crypto(
        blockchain: &str,
        data_type: CryptoDataType,
        crypto_data: &str,
        reference: ReferenceIndicator,
        referenced_message: &str,
    ) -> Self {
        Self {
            meta_header: MetaHeader {
                blockchain: blockchain.to_string(),
                transceive_direction: Some(TransceiveDirection::Tx),
                ..MetaHeader::default()
            },
            message_header: MessageHeader {
                message_code: 'K',
                reference_indicator: reference.as_char(),
                referenced_message: referenced_message.to_string(),
                ..MessageHeader::default()
            },
            message_body: MessageBody::Crypto {
                crypto_data_type: data_type.as_field().to_string(),
                crypto_data: crypto_data.to_string(),
            },
        }
    }

    /// The parsed message code, if recognised.
    #[must_use]
    pub fn code(&self) -> Option<MessageCode> {
        MessageCode::from_code(self.message_header.message_code)
    }

    /// The parsed reference indicator, if recognised.
    #[must_use]
    pub fn reference(&self) -> Option<ReferenceIndicator> {
        ReferenceIndicator::from_code(self.message_header.reference_indicator)
    }

    /// Whether the message was sent with one of the two encryption methods.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        matches!(self.message_header.encryption_indicator, '1' | '2')
    }

    /// Whether the originator signalled duress.
    #[must_use]
    pub fn under_duress(&self) -> bool {
        self.message_header.duress_indicator != '0'
    }

    /// The verification method of an `A` message body.
    #[must_use]
    pub fn verification_method(&self) -> Option<VerificationMethod> {
        match &self.message_body {
            MessageBody::Authentication {
                verification_method,
                ..
            } => VerificationMethod::from_field(verification_method),
            _ => None,
        }
    }

    /// The verification data of an `A` message body.
    #[must_use]
    pub fn verification_data(&self) -> Option<&str> {
        match &self.message_body {
            MessageBody::Authentication {
                verification_data, ..
            } => Some(verification_data.as_str()),
            _ => None,
        }
    }

    /// The crypto data type of a `K` message body.
    #[must_use]
    pub fn crypto_data_type(&self) -> Option<CryptoDataType> {
        match &self.message_body {
            MessageBody::Crypto {
                crypto_data_type, ..
            } => CryptoDataType::from_field(crypto_data_type),
            _ => None,
        }
    }

    /// The crypto data of a `K` message body.
    #[must_use]
    pub fn crypto_data(&self) -> Option<&str> {
        match &self.message_body {
            MessageBody::Crypto { crypto_data, .. } => Some(crypto_data.as_str()),
            _ => None,
        }
    }

    /// Whether this message originated from this gateway.
    #[must_use]
    pub fn is_own(&self) -> bool {
        self.meta_header.transceive_direction == Some(TransceiveDirection::Tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_json() -> serde_json::Value {
        serde_json::json!({
            "MetaHeader": {
                "blockchain": "blockchain-test",
                "transactionHash": "a1b2c3",
                "originatorAddress": "0x1f2e3d",
                "originatorPubKey": "02abcd",
                "transceiveDirection": "RX",
                "blockNumber": 77
            },
            "MessageHeader": {
                "Prefix": "WF",
                "Version": "1",
                "EncryptionIndicator": "0",
                "DuressIndicator": "0",
                "MessageCode": "A",
                "ReferenceIndicator": "0",
                "ReferencedMessage": "0".repeat(64)
            },
            "MessageBody": {
                "VerificationMethod": "1",
                "VerificationData": "https://organisation.int/whiteflag"
            }
        })
    }

    #[test]
    fn test_auth_message_roundtrip() {
        let message: WfMessage = serde_json::from_value(auth_json()).unwrap();
        assert_eq!(message.code(), Some(MessageCode::Authentication));
        assert_eq!(
            message.verification_method(),
            Some(VerificationMethod::Signature)
        );
        assert_eq!(
            message.verification_data(),
            Some("https://organisation.int/whiteflag")
        );
        assert_eq!(message.meta_header.block_number, Some(77));

        let encoded = serde_json::to_value(&message).unwrap();
        let decoded: WfMessage = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_crypto_message_builder() {
        let message = WfMessage::crypto(
            "blockchain-test",
            CryptoDataType::InitVector1,
            "00112233445566778899aabbccddeeff",
            ReferenceIndicator::Append,
            "ab".repeat(32).as_str(),
        );
        assert_eq!(message.crypto_data_type(), Some(CryptoDataType::InitVector1));
        assert_eq!(message.message_header.reference_indicator, '3');
        assert!(message.is_own());
        assert!(!message.is_encrypted());
    }

    #[test]
    fn test_unknown_body_passthrough() {
        let json = serde_json::json!({
            "MessageHeader": {
                "Prefix": "WF",
                "Version": "1",
                "EncryptionIndicator": "1",
                "DuressIndicator": "0",
                "MessageCode": "P",
                "ReferenceIndicator": "0",
                "ReferencedMessage": "0".repeat(64)
            },
            "MessageBody": {
                "SubjectCode": "10",
                "DateTime": "2024-01-01T00:00:00Z"
            }
        });
        let message: WfMessage = serde_json::from_value(json).unwrap();
        assert!(matches!(message.message_body, MessageBody::Other(_)));
        assert!(message.is_encrypted());
        assert!(message.crypto_data().is_none());
    }
}
