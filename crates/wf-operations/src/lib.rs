//! # wf-operations
//!
//! The stable operator surface over the state store: originator records,
//! pre-shared encryption keys and shared authentication tokens.
//!
//! ## Secret handling
//!
//! Raw secrets enter these operations in zeroising buffers, are enveloped
//! by the keystore, and are wiped when the request completes. They are
//! never logged and never echoed back.
//!
//! ## Response style
//!
//! Imperative operations return errors only; indicative ones additionally
//! return an informational string for conditions that do not warrant a
//! failure, e.g. deleting a key that was already gone.

pub mod errors;
pub mod service;

pub use errors::OperationError;
pub use service::{OperationsService, StoreAuthTokenRequest};
