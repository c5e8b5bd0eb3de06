use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::types::{NotifierError, Result};

const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 3600;
const DEFAULT_DATA_FILE: &str = "./data.json";

/// Application configuration, loaded once at startup and immutable for
/// the lifetime of the process.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// State file for watermarks and subscribers.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Poll interval applied to feeds without their own.
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u64,

    pub feeds: Vec<FeedConfig>,
}

/// A single feed source: its address and an optional poll interval
/// overriding the global one.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub url: String,

    #[serde(default)]
    pub interval_secs: Option<u64>,
}

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

fn default_update_interval() -> u64 {
    DEFAULT_UPDATE_INTERVAL_SECS
}

impl Config {
    /// Reads and validates configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let config: Config = serde_json::from_slice(&data)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.feeds.is_empty() {
            return Err(NotifierError::Config("no feeds configured".to_string()));
        }
        if self.update_interval_secs == 0 {
            return Err(NotifierError::Config(
                "update_interval_secs must be positive".to_string(),
            ));
        }
        for feed in &self.feeds {
            Url::parse(&feed.url)?;
            if feed.interval_secs == Some(0) {
                return Err(NotifierError::Config(format!(
                    "interval_secs must be positive for feed {}",
                    feed.url
                )));
            }
        }
        Ok(())
    }

    /// Effective poll interval for one feed.
    pub fn feed_interval(&self, feed: &FeedConfig) -> Duration {
        Duration::from_secs(feed.interval_secs.unwrap_or(self.update_interval_secs))
    }
}
