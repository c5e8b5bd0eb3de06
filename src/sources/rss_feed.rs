use async_trait::async_trait;
use tracing::debug;

use crate::fetcher::HttpFetcher;
use crate::parser::FeedParser;
use crate::traits::FetchItems;
use crate::types::{FeedItem, FetchConfig, Result};

/// Remote RSS/Atom feed behind the [`FetchItems`] capability.
///
/// The feed URL doubles as the source identifier, which is what the
/// watermark store keys on.
pub struct RssFeedSource {
    url: String,
    fetcher: HttpFetcher,
    parser: FeedParser,
}

impl RssFeedSource {
    pub fn new(url: String, fetch_config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            url,
            fetcher: HttpFetcher::new(fetch_config)?,
            parser: FeedParser::new(),
        })
    }
}

#[async_trait]
impl FetchItems for RssFeedSource {
    fn source_id(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Vec<FeedItem>> {
        let body = self.fetcher.fetch_body(&self.url).await?;
        let items = self.parser.parse(&body)?;
        debug!("Parsed {} items from {}", items.len(), self.url);
        Ok(items)
    }
}
