use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::traits::{SubscriberStore, WatermarkStore};
use crate::types::Result;

/// On-disk and in-memory representation of the persisted state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StorageState {
    #[serde(default)]
    subscribers: Vec<String>,

    #[serde(default)]
    feeds: HashMap<String, DateTime<Utc>>,
}

/// Storage that keeps all state in memory. Useful for tests and
/// ephemeral runs; everything is lost on shutdown.
pub struct MemoryStore {
    state: Mutex<StorageState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StorageState::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WatermarkStore for MemoryStore {
    async fn last_update(&self, feed: &str) -> Result<Option<DateTime<Utc>>> {
        let state = self.state.lock().await;
        Ok(state.feeds.get(feed).copied())
    }

    async fn save_last_update(&self, feed: &str, t: DateTime<Utc>) -> Result<()> {
        let mut state = self.state.lock().await;
        state.feeds.insert(feed.to_string(), t);
        Ok(())
    }
}

#[async_trait]
impl SubscriberStore for MemoryStore {
    async fn subscribers(&self) -> Result<Vec<String>> {
        let state = self.state.lock().await;
        Ok(state.subscribers.clone())
    }

    async fn save_subscribers(&self, ids: &[String]) -> Result<()> {
        let mut state = self.state.lock().await;
        state.subscribers = ids.to_vec();
        Ok(())
    }
}

/// Storage backed by a JSON file.
///
/// The whole state is rewritten on every save, under the store's lock,
/// so concurrent writers from different feeds are serialized and the
/// file is always a complete snapshot.
pub struct FileStore {
    path: PathBuf,
    state: Mutex<StorageState>,
}

impl FileStore {
    /// Opens the state file, creating it with empty state if missing.
    pub async fn open(path: &Path) -> Result<Self> {
        let state = match tokio::fs::read(path).await {
            Ok(data) => serde_json::from_slice(&data)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Initializing state file: {}", path.display());
                let state = StorageState::default();
                write_state(path, &state).await?;
                state
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path: path.to_path_buf(),
            state: Mutex::new(state),
        })
    }
}

async fn write_state(path: &Path, state: &StorageState) -> Result<()> {
    let data = serde_json::to_vec_pretty(state)?;
    tokio::fs::write(path, data).await?;
    Ok(())
}

#[async_trait]
impl WatermarkStore for FileStore {
    async fn last_update(&self, feed: &str) -> Result<Option<DateTime<Utc>>> {
        let state = self.state.lock().await;
        Ok(state.feeds.get(feed).copied())
    }

    async fn save_last_update(&self, feed: &str, t: DateTime<Utc>) -> Result<()> {
        let mut state = self.state.lock().await;
        state.feeds.insert(feed.to_string(), t);
        write_state(&self.path, &state).await
    }
}

#[async_trait]
impl SubscriberStore for FileStore {
    async fn subscribers(&self) -> Result<Vec<String>> {
        let state = self.state.lock().await;
        Ok(state.subscribers.clone())
    }

    async fn save_subscribers(&self, ids: &[String]) -> Result<()> {
        let mut state = self.state.lock().await;
        state.subscribers = ids.to_vec();
        write_state(&self.path, &state).await
    }
}
