//! # gateway-runtime
//!
//! Wires the gateway subsystems together and hosts the node binary.
//!
//! ## Wiring
//!
//! ```text
//! [Listeners] ──MessageReceived──→ [rx] ──(codec pipeline)──→ MessageProcessed
//!                                                                  │
//!                                                           [Management]
//!                                                                  │
//! [tx] ←──MessageCommitted── auto-responses ←──(after-send delay)──┘
//! ```
//!
//! Chain wire clients and the full codec pipeline are collaborators
//! provided by the embedding application; the runtime exposes the seams
//! to plug them in and sensible pass-through bridges for running without
//! them.

pub mod adapters;
pub mod config;
pub mod gateway;
pub mod pipeline;

pub use adapters::UnresolvedRetriever;
pub use config::{ConfigError, GatewayConfig};
pub use gateway::Gateway;
