//! State store configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// State store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StateConfig {
    /// Master encryption key, 32 octets hex. Always required: individual
    /// keystore records are envelope-encrypted even when the state blob
    /// itself is not.
    pub master_key: String,

    /// Whether the state blob is encrypted at rest. When `false` the blob
    /// is stored in the plain fallback form.
    pub encryption: bool,

    /// Optional on-disk mirror of the blob next to the datastore.
    pub state_file: Option<PathBuf>,

    /// Directory for single-account backup files.
    pub account_backup_dir: Option<PathBuf>,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            master_key: String::new(),
            encryption: true,
            state_file: None,
            account_backup_dir: None,
        }
    }
}

impl StateConfig {
    /// Create a config for testing (fixed key, no mirror).
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            master_key: "1c".repeat(32),
            encryption: true,
            state_file: None,
            account_backup_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_encrypts() {
        assert!(StateConfig::default().encryption);
    }

    #[test]
    fn test_testing_key_length() {
        assert_eq!(StateConfig::for_testing().master_key.len(), 64);
    }
}
