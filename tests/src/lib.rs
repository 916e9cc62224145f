//! # Whiteflag Gateway Test Suite
//!
//! Cross-subsystem integration flows:
//!
//! ```text
//! tests/src/integration/
//! ├── state_scenarios.rs   # State store end-to-end scenarios
//! └── flows.rs             # Listener → rx → management choreography
//! ```
//!
//! Run with `cargo test -p wf-tests`.

#[cfg(test)]
mod integration;
