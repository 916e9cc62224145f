//! Cursor placement and per-chain sync state.

use serde::{Deserialize, Serialize};

/// Decide which block the listener treats as the last processed one.
///
/// In order of precedence: an explicit configuration, a bounded look-back
/// when the node is far ahead of the stored cursor, the stored cursor
/// itself, and finally the chain head.
#[must_use]
pub fn determine_starting_block(
    highest: u64,
    current: u64,
    configured_start: u64,
    restart: u64,
) -> u64 {
    if configured_start > 0 {
        configured_start - 1
    } else if highest.saturating_sub(restart) > current + 1 {
        highest - restart - 1
    } else if current > 0 {
        current
    } else if highest > 0 {
        highest - 1
    } else {
        1
    }
}

/// Mutable sync state of one chain listener.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncState {
    /// Last processed block.
    pub cursor: u64,

    /// Completed iterations.
    pub iteration: u64,

    /// Highest block last reported by the node.
    pub discovered_highest: u64,

    /// Consecutive failures of the current batch.
    pub retry_count: u32,

    /// Blocks given up on after retry exhaustion.
    pub skipped_blocks: u64,

    /// Upper bound of the current processing window.
    pub end_block: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_starting_block_table() {
        // Far-ahead node: look back by the restart depth.
        assert_eq!(determine_starting_block(100, 0, 0, 20), 79);
        // Stored cursor close to the head: resume from it.
        assert_eq!(determine_starting_block(100, 90, 0, 20), 90);
        // Explicit configuration wins.
        assert_eq!(determine_starting_block(100, 0, 50, 0), 49);
        // Nothing known at all.
        assert_eq!(determine_starting_block(0, 0, 0, 0), 1);
    }

    #[test]
    fn test_fresh_chain_follows_head() {
        assert_eq!(determine_starting_block(5, 0, 0, 100), 4);
    }

    proptest! {
        // For sensible inputs the cursor lands strictly below the head.
        #[test]
        fn prop_start_below_highest(
            highest in 1u64..1_000_000,
            current_frac in 0u64..1_000_000,
            start_frac in 0u64..1_000_000,
            restart in 0u64..10_000,
        ) {
            let current = current_frac % highest;
            let configured_start = start_frac % (highest + 1);
            let start = determine_starting_block(highest, current, configured_start, restart);
            prop_assert!(start < highest);
        }
    }
}
