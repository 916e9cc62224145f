//! Cross-subsystem integration tests.

mod flows;
mod state_scenarios;
