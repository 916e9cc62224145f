//! # wf-management
//!
//! The management plane: reacts to every processed message.
//!
//! ## Dispatch
//!
//! ```text
//! rx MessageProcessed ──┬── A ──→ verify / retract authentication ──→ rx MessageUpdated
//!                       ├── K(11|21) ──→ initialisation vector handling
//!                       └── K(0A) ──→ ECDH public key handling
//!
//! tx MessageProcessed ──(after-send delay)──→ auto-responses ──→ tx MessageCommitted
//! ```
//!
//! Auto-responses pair an IV `K` message with every encrypted message this
//! gateway sends, and answer authentication messages with the gateway's
//! ECDH public key so peers can negotiate shared encryption secrets.

pub mod adapters;
pub mod config;
pub mod errors;
pub mod ports;
pub mod service;

pub use adapters::MockMessageRetriever;
pub use config::ManagementConfig;
pub use errors::ManagementError;
pub use ports::{MessageRetriever, RetrieveError};
pub use service::ManagementService;
