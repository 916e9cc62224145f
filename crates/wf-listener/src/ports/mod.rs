//! Outbound ports of the listener.

pub mod chain_rpc;

pub use chain_rpc::{ChainRpc, RpcError};
