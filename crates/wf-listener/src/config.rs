//! Block listener configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Floor for the RPC timeout.
pub const MIN_RPC_TIMEOUT_MILLIS: u64 = 500;

/// Listener configuration for one chain.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListenerConfig {
    /// Chain this listener crawls.
    pub blockchain: String,

    /// Polling interval between iterations, milliseconds.
    pub interval_millis: u64,

    /// Look-back depth when the node is far ahead of the stored cursor.
    pub restart_depth: u64,

    /// Batch failures tolerated before the batch is skipped; `0` retries
    /// forever.
    pub max_retries: u32,

    /// Blocks fetched concurrently per iteration.
    pub batch_size: u64,

    /// Per-call RPC timeout, milliseconds. Clamped to at least
    /// [`MIN_RPC_TIMEOUT_MILLIS`].
    pub rpc_timeout_millis: u64,

    /// Configured starting block; `0` derives one from the chain state.
    pub starting_block: u64,

    /// Bounded end block; `0` follows the chain head.
    pub end_block: u64,

    /// Blocks on top of a transaction before it counts as confirmed.
    pub confirmation_depth: u64,

    /// Dump raw blocks and the full parameter set at trace level.
    pub trace_raw: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            blockchain: String::new(),
            interval_millis: 6000,
            restart_depth: 100,
            max_retries: 5,
            batch_size: 10,
            rpc_timeout_millis: 10_000,
            starting_block: 0,
            end_block: 0,
            confirmation_depth: 8,
            trace_raw: false,
        }
    }
}

impl ListenerConfig {
    /// Create a config for testing (tight timings, small batches).
    #[must_use]
    pub fn for_testing(blockchain: &str) -> Self {
        Self {
            blockchain: blockchain.to_string(),
            interval_millis: 10,
            restart_depth: 10,
            max_retries: 2,
            batch_size: 3,
            rpc_timeout_millis: MIN_RPC_TIMEOUT_MILLIS,
            starting_block: 0,
            end_block: 0,
            confirmation_depth: 4,
            trace_raw: false,
        }
    }

    /// The effective RPC timeout.
    #[must_use]
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_millis.max(MIN_RPC_TIMEOUT_MILLIS))
    }

    /// The polling interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_millis)
    }
}
