//! Signature fetcher adapters.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;
use url::Url;

use crate::ports::{FetchError, SignatureFetcher};

/// HTTP(S) fetcher over a shared `reqwest` client.
pub struct HttpSignatureFetcher {
    client: reqwest::Client,
}

impl HttpSignatureFetcher {
    /// Create a fetcher with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` when the client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError(format!("cannot build http client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SignatureFetcher for HttpSignatureFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        debug!(url = %url, "retrieving published signature");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError(format!("request to {url} failed: {e}")))?;
        let response = response
            .error_for_status()
            .map_err(|e| FetchError(format!("{url} answered with an error: {e}")))?;
        response
            .text()
            .await
            .map_err(|e| FetchError(format!("cannot read body from {url}: {e}")))
    }
}

/// In-memory fetcher for tests.
#[derive(Default)]
pub struct MockSignatureFetcher {
    responses: Mutex<HashMap<String, String>>,
}

impl MockSignatureFetcher {
    /// Create an empty fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a body under a URL.
    pub fn publish(&self, url: &str, body: &str) {
        self.responses
            .lock()
            .insert(url.to_string(), body.to_string());
    }
}

#[async_trait]
impl SignatureFetcher for MockSignatureFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        self.responses
            .lock()
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError(format!("nothing published at {url}")))
    }
}
