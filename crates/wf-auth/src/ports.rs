//! Outbound ports of the authentication plane.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Retrieval failure for a published signature.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct FetchError(pub String);

/// Retrieves the body published at an originator's signature URL.
#[async_trait]
pub trait SignatureFetcher: Send + Sync {
    /// Fetch the response body at `url`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` for network failures and non-success statuses.
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}
