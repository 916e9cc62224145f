//! Gateway error taxonomy shared across subsystems.

use thiserror::Error;

/// Protocol invariant violations in a Whiteflag message.
///
/// Carries the protocol error code plus every contributing cause, so a
/// failed verification reports all assertion failures at once.
#[derive(Debug, Clone, Error)]
#[error("{}: {}", .kind.code(), .causes.join("; "))]
pub struct ProtocolError {
    /// Which protocol invariant was violated.
    pub kind: ProtocolErrorKind,
    /// Human-readable contributing causes.
    pub causes: Vec<String>,
}

impl ProtocolError {
    /// Build a protocol error from its contributing causes.
    #[must_use]
    pub fn new(kind: ProtocolErrorKind, causes: Vec<String>) -> Self {
        Self { kind, causes }
    }

    /// Single-cause convenience constructor.
    #[must_use]
    pub fn single(kind: ProtocolErrorKind, cause: impl Into<String>) -> Self {
        Self {
            kind,
            causes: vec![cause.into()],
        }
    }
}

/// Protocol error classes with their wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolErrorKind {
    /// Originator authentication failed.
    AuthenticationError,
    /// A signature could not be created or verified.
    SignatureError,
    /// The message metaheader is inconsistent.
    MetaheaderError,
}

impl ProtocolErrorKind {
    /// The protocol error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthenticationError => "WF_AUTH_ERROR",
            Self::SignatureError => "WF_SIGN_ERROR",
            Self::MetaheaderError => "WF_METAHEADER_ERROR",
        }
    }
}

/// Domain-recoverable failures reported to callers.
///
/// These never abort the gateway; the caller decides whether to surface
/// data alongside the error (indicative) or the error alone (imperative).
#[derive(Debug, Clone, Error)]
pub enum ProcessingError {
    /// The requested data does not exist or carries no protocol content.
    #[error("no data: {0}")]
    NoData(String),

    /// A referenced resource (originator, account, key) is unknown.
    #[error("no such resource: {0}")]
    NoResource(String),

    /// The request is inconsistent or incomplete.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The operation exists but is not supported by this gateway.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// The operation would overwrite an existing resource.
    #[error("resource conflict: {0}")]
    Conflict(String),
}
