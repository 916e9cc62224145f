//! Enumerated Whiteflag message codes and indicator values.

use serde::{Deserialize, Serialize};

/// Whiteflag message code, the single character after the reference fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageCode {
    /// `A` - originator authentication.
    Authentication,
    /// `K` - cryptographic support (initialisation vectors, ECDH keys).
    Cryptographic,
    /// `T` - test message.
    Test,
    /// `F` - free text.
    FreeText,
    /// `R` - resource.
    Resource,
    /// `P` - protective sign.
    ProtectiveSign,
    /// `E` - emergency signal.
    EmergencySignal,
    /// `D` - danger sign.
    DangerSign,
    /// `S` - status signal.
    StatusSignal,
    /// `I` - infrastructure sign.
    InfrastructureSign,
    /// `M` - mission sign.
    MissionSign,
    /// `Q` - request signal.
    RequestSignal,
}

impl MessageCode {
    /// Parse a message code character.
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'A' => Some(Self::Authentication),
            'K' => Some(Self::Cryptographic),
            'T' => Some(Self::Test),
            'F' => Some(Self::FreeText),
            'R' => Some(Self::Resource),
            'P' => Some(Self::ProtectiveSign),
            'E' => Some(Self::EmergencySignal),
            'D' => Some(Self::DangerSign),
            'S' => Some(Self::StatusSignal),
            'I' => Some(Self::InfrastructureSign),
            'M' => Some(Self::MissionSign),
            'Q' => Some(Self::RequestSignal),
            _ => None,
        }
    }

    /// The wire character for this code.
    #[must_use]
    pub fn as_char(&self) -> char {
        match self {
            Self::Authentication => 'A',
            Self::Cryptographic => 'K',
            Self::Test => 'T',
            Self::FreeText => 'F',
            Self::Resource => 'R',
            Self::ProtectiveSign => 'P',
            Self::EmergencySignal => 'E',
            Self::DangerSign => 'D',
            Self::StatusSignal => 'S',
            Self::InfrastructureSign => 'I',
            Self::MissionSign => 'M',
            Self::RequestSignal => 'Q',
        }
    }
}

/// Relation of a message to a previously sent message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceIndicator {
    /// `0` - original, stand-alone message.
    Original,
    /// `1` - recall of the referenced message.
    Recall,
    /// `2` - update of the referenced message.
    Update,
    /// `3` - appends information to the referenced message.
    Append,
    /// `4` - discontinues the referenced message.
    Discontinue,
}

impl ReferenceIndicator {
    /// Parse a reference indicator character.
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            '0' => Some(Self::Original),
            '1' => Some(Self::Recall),
            '2' => Some(Self::Update),
            '3' => Some(Self::Append),
            '4' => Some(Self::Discontinue),
            _ => None,
        }
    }

    /// The wire character for this indicator.
    #[must_use]
    pub fn as_char(&self) -> char {
        match self {
            Self::Original => '0',
            Self::Recall => '1',
            Self::Update => '2',
            Self::Append => '3',
            Self::Discontinue => '4',
        }
    }

    /// Recall and discontinue both retract the referenced message.
    #[must_use]
    pub fn retracts(&self) -> bool {
        matches!(self, Self::Recall | Self::Discontinue)
    }
}

/// Originator authentication method of an `A` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationMethod {
    /// `1` - digital signature published at a URL.
    Signature,
    /// `2` - pre-shared authentication token.
    Token,
}

impl VerificationMethod {
    /// Parse the `VerificationMethod` field value.
    #[must_use]
    pub fn from_field(value: &str) -> Option<Self> {
        match value {
            "1" => Some(Self::Signature),
            "2" => Some(Self::Token),
            _ => None,
        }
    }
}

/// Content type of the `CryptoData` field of a `K` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CryptoDataType {
    /// `0A` - ECDH public key for key negotiation.
    EcdhPublicKey,
    /// `11` - initialisation vector for encryption method 1.
    InitVector1,
    /// `21` - initialisation vector for encryption method 2.
    InitVector2,
}

impl CryptoDataType {
    /// Parse the `CryptoDataType` field value.
    #[must_use]
    pub fn from_field(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("0A") {
            return Some(Self::EcdhPublicKey);
        }
        match value {
            "11" => Some(Self::InitVector1),
            "21" => Some(Self::InitVector2),
            _ => None,
        }
    }

    /// The wire field value for this type.
    #[must_use]
    pub fn as_field(&self) -> &'static str {
        match self {
            Self::EcdhPublicKey => "0A",
            Self::InitVector1 => "11",
            Self::InitVector2 => "21",
        }
    }

    /// The encryption method an initialisation vector belongs to, if any.
    #[must_use]
    pub fn encryption_indicator(&self) -> Option<char> {
        match self {
            Self::InitVector1 => Some('1'),
            Self::InitVector2 => Some('2'),
            Self::EcdhPublicKey => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_code_roundtrip() {
        for code in ['A', 'K', 'T', 'F', 'R', 'P', 'E', 'D', 'S', 'I', 'M', 'Q'] {
            let parsed = MessageCode::from_code(code).unwrap();
            assert_eq!(parsed.as_char(), code);
        }
        assert!(MessageCode::from_code('X').is_none());
    }

    #[test]
    fn test_reference_indicator_retracts() {
        assert!(ReferenceIndicator::Recall.retracts());
        assert!(ReferenceIndicator::Discontinue.retracts());
        assert!(!ReferenceIndicator::Update.retracts());
        assert!(ReferenceIndicator::from_code('7').is_none());
    }

    #[test]
    fn test_crypto_data_type_case_insensitive() {
        assert_eq!(
            CryptoDataType::from_field("0a"),
            Some(CryptoDataType::EcdhPublicKey)
        );
        assert_eq!(
            CryptoDataType::from_field("21"),
            Some(CryptoDataType::InitVector2)
        );
        assert_eq!(CryptoDataType::InitVector1.encryption_indicator(), Some('1'));
    }

    #[test]
    fn test_verification_method_parsing() {
        assert_eq!(
            VerificationMethod::from_field("1"),
            Some(VerificationMethod::Signature)
        );
        assert_eq!(
            VerificationMethod::from_field("2"),
            Some(VerificationMethod::Token)
        );
        assert!(VerificationMethod::from_field("3").is_none());
    }
}
