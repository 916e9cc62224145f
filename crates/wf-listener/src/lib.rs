//! # wf-listener
//!
//! Per-chain block listener.
//!
//! ## Role in System
//!
//! - **Producer only**: crawls blocks in order from a starting cursor,
//!   extracts Whiteflag messages through the codec port and emits them as
//!   `MessageReceived` on the rx stream. Never mutates originator state.
//! - **Batched**: up to `batch_size` block fetches are in flight per
//!   iteration; the cursor advances atomically once the whole batch
//!   resolves.
//! - **Self-healing**: transient RPC failures are retried per batch; a
//!   batch that keeps failing past `max_retries` is skipped and logged.
//!
//! ## Iteration state machine
//!
//! ```text
//! Idle ──interval──→ Fetch highest ──no work──→ Idle
//!                          │
//!                       Process batch
//!                      │          │
//!               more work      error
//!                (50 ms)    (retry delay)
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{FixtureCodec, MockChainRpc};
pub use config::ListenerConfig;
pub use domain::cursor::{determine_starting_block, SyncState};
pub use domain::errors::ListenerError;
pub use ports::{ChainRpc, RpcError};
pub use service::{BlockListener, IterationOutcome};

/// Delay before the next iteration when the last one left work behind.
pub const IMMEDIATE_RESCHEDULE_MILLIS: u64 = 50;
