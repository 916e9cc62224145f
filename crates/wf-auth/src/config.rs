//! Authentication plane configuration.

use serde::{Deserialize, Serialize};

/// Authentication configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthConfig {
    /// Hosts a published signature URL may point at. Empty allows any
    /// host.
    pub valid_domains: Vec<String>,
}

impl AuthConfig {
    /// Whether a URL host passes the allowlist.
    #[must_use]
    pub fn domain_allowed(&self, host: &str) -> bool {
        self.valid_domains.is_empty()
            || self
                .valid_domains
                .iter()
                .any(|domain| domain.eq_ignore_ascii_case(host))
    }
}
