//! Management plane configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Management configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManagementConfig {
    /// Delay between a sent message being processed and its auto-response,
    /// milliseconds. Gives the transaction time to settle on chain.
    pub after_send_delay_millis: u64,
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self {
            after_send_delay_millis: 12_000,
        }
    }
}

impl ManagementConfig {
    /// Create a config for testing (no waiting).
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            after_send_delay_millis: 0,
        }
    }

    /// The effective after-send delay.
    #[must_use]
    pub fn after_send_delay(&self) -> Duration {
        Duration::from_millis(self.after_send_delay_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delay() {
        assert_eq!(
            ManagementConfig::default().after_send_delay(),
            Duration::from_secs(12)
        );
    }
}
