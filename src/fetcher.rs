use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::types::{FetchConfig, Result};

/// HTTP transfer for feed documents.
///
/// The client carries a hard request timeout so that a stalled remote
/// cannot hold a poll cycle open indefinitely.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches the raw feed document from `url`.
    pub async fn fetch_body(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Fetching feed: {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}
