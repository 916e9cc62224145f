//! Unified gateway configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wf_auth::AuthConfig;
use wf_listener::ListenerConfig;
use wf_management::ManagementConfig;
use wf_state::StateConfig;

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config {path}: {reason}")]
    Unreadable {
        /// The attempted path.
        path: PathBuf,
        /// The underlying failure.
        reason: String,
    },

    /// The file is not a valid configuration.
    #[error("config {path} is invalid: {reason}")]
    Invalid {
        /// The attempted path.
        path: PathBuf,
        /// The underlying failure.
        reason: String,
    },
}

/// Complete gateway configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayConfig {
    /// Path of the file-backed datastore.
    pub datastore_file: PathBuf,

    /// State store configuration.
    pub state: StateConfig,

    /// Authentication configuration.
    pub auth: AuthConfig,

    /// Management configuration.
    pub management: ManagementConfig,

    /// One listener per crawled chain.
    pub listeners: Vec<ListenerConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            datastore_file: PathBuf::from("./data/state.json"),
            state: StateConfig::default(),
            auth: AuthConfig::default(),
            management: ManagementConfig::default(),
            listeners: Vec::new(),
        }
    }
}

impl GatewayConfig {
    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] for unreadable or invalid files.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Create a config for testing (in-memory style paths, test key).
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            state: StateConfig::for_testing(),
            management: ManagementConfig::for_testing(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.json");

        let mut config = GatewayConfig::for_testing();
        config.auth.valid_domains.push("organisation.int".to_string());
        std::fs::write(&path, serde_json::to_vec_pretty(&config).unwrap()).unwrap();

        let loaded = GatewayConfig::load(&path).unwrap();
        assert_eq!(loaded.auth.valid_domains, vec!["organisation.int"]);
        assert_eq!(loaded.state.master_key, config.state.master_key);
    }

    #[test]
    fn test_missing_file_reported() {
        let result = GatewayConfig::load("/nonexistent/gateway.json");
        assert!(matches!(result, Err(ConfigError::Unreadable { .. })));
    }

    #[test]
    fn test_invalid_json_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.json");
        std::fs::write(&path, b"{oops").unwrap();
        assert!(matches!(
            GatewayConfig::load(&path),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
