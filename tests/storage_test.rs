use std::io::Write;

use chrono::{TimeZone, Utc};

use feed_notifier::traits::{SubscriberStore, WatermarkStore};
use feed_notifier::{Config, FeedParser, FileStore, MemoryStore};

#[tokio::test]
async fn memory_store_returns_none_for_unknown_feed() {
    let store = MemoryStore::new();
    assert!(store.last_update("https://example.com/rss").await.unwrap().is_none());
}

#[tokio::test]
async fn memory_store_round_trips_watermark() {
    let store = MemoryStore::new();
    let t = Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap();

    store.save_last_update("f1", t).await.unwrap();
    assert_eq!(store.last_update("f1").await.unwrap(), Some(t));
    assert!(store.last_update("f2").await.unwrap().is_none());
}

#[tokio::test]
async fn file_store_initializes_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");

    let store = FileStore::open(&path).await.unwrap();
    assert!(path.exists(), "state file was not created");
    assert!(store.last_update("f1").await.unwrap().is_none());
    assert!(store.subscribers().await.unwrap().is_empty());
}

#[tokio::test]
async fn file_store_round_trips_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let t = Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap();

    {
        let store = FileStore::open(&path).await.unwrap();
        store.save_last_update("https://example.com/rss", t).await.unwrap();
        store
            .save_subscribers(&["1".to_string(), "2".to_string()])
            .await
            .unwrap();
    }

    let store = FileStore::open(&path).await.unwrap();
    assert_eq!(
        store.last_update("https://example.com/rss").await.unwrap(),
        Some(t)
    );
    assert_eq!(
        store.subscribers().await.unwrap(),
        vec!["1".to_string(), "2".to_string()]
    );
}

#[tokio::test]
async fn file_store_rejects_corrupt_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(&path, b"not json").unwrap();

    assert!(FileStore::open(&path).await.is_err());
}

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn config_applies_defaults() {
    let file = write_config(r#"{"feeds": [{"url": "https://example.com/rss"}]}"#);
    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.update_interval_secs, 3600);
    assert_eq!(config.data_file, std::path::PathBuf::from("./data.json"));
    assert_eq!(
        config.feed_interval(&config.feeds[0]),
        std::time::Duration::from_secs(3600)
    );
}

#[test]
fn config_honors_per_feed_interval() {
    let file = write_config(
        r#"{
            "update_interval_secs": 600,
            "feeds": [
                {"url": "https://example.com/a"},
                {"url": "https://example.com/b", "interval_secs": 60}
            ]
        }"#,
    );
    let config = Config::load(file.path()).unwrap();

    assert_eq!(
        config.feed_interval(&config.feeds[0]),
        std::time::Duration::from_secs(600)
    );
    assert_eq!(
        config.feed_interval(&config.feeds[1]),
        std::time::Duration::from_secs(60)
    );
}

#[test]
fn config_rejects_empty_feed_list() {
    let file = write_config(r#"{"feeds": []}"#);
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn config_rejects_invalid_feed_url() {
    let file = write_config(r#"{"feeds": [{"url": "not a url"}]}"#);
    assert!(Config::load(file.path()).is_err());
}

const RSS_DOC: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test feed</title>
    <link>https://example.com</link>
    <description>test</description>
    <item>
      <title>One</title>
      <link>https://example.com/1</link>
      <pubDate>Wed, 01 Jan 2020 15:00:00 GMT</pubDate>
    </item>
    <item>
      <title>No date</title>
      <link>https://example.com/2</link>
    </item>
  </channel>
</rss>"#;

#[test]
fn parser_extracts_items_and_skips_undated_entries() {
    let items = FeedParser::new().parse(RSS_DOC).unwrap();

    // The undated entry cannot be compared against a watermark.
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title.as_deref(), Some("One"));
    assert_eq!(items[0].link.as_deref(), Some("https://example.com/1"));
    assert_eq!(
        items[0].published,
        Utc.with_ymd_and_hms(2020, 1, 1, 15, 0, 0).unwrap()
    );
}

const ATOM_DOC: &[u8] = br#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Test feed</title>
  <id>urn:test</id>
  <updated>2020-01-02T00:00:00Z</updated>
  <entry>
    <id>urn:test:1</id>
    <title>First</title>
    <link href="https://example.com/1"/>
    <published>2020-01-01T10:00:00Z</published>
    <updated>2020-01-01T12:00:00Z</updated>
  </entry>
</feed>"#;

#[test]
fn parser_prefers_update_timestamp_over_publication() {
    let items = FeedParser::new().parse(ATOM_DOC).unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].published,
        Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap()
    );
}

#[test]
fn parser_rejects_garbage() {
    assert!(FeedParser::new().parse(b"definitely not xml").is_err());
}
