//! Test doubles for the listener's collaborator ports.
//!
//! Used by this crate's tests and by the workspace integration suite; the
//! production adapters (wire RPC clients, the real codec) live outside
//! this workspace.

pub mod mock;

pub use mock::{FixtureCodec, MockChainRpc};
