use std::fmt;

use chrono::{DateTime, Utc};

/// A single feed entry, normalized for delivery.
///
/// The publish timestamp is the dedup cursor: two items with the same
/// timestamp for one feed are treated as not-newer-than each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub published: DateTime<Utc>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub media: Option<String>,
}

impl fmt::Display for FeedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = self
            .link
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or("<untitled>");
        write!(f, "[{}] {}", self.published.format("%Y-%m-%d %H:%M"), what)
    }
}

/// HTTP transfer settings for feed fetching.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "feed-notifier/0.1".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NotifierError>;
