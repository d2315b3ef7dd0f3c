use hl_core::{Article, ArticleId, Error, KeyValueStore, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

pub mod backends;

pub use backends::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    File,
    #[cfg(feature = "sqlite")]
    Sqlite,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "file" => Ok(StorageKind::File),
            #[cfg(feature = "sqlite")]
            "sqlite" => Ok(StorageKind::Sqlite),
            other => Err(Error::Config(format!("Unsupported storage backend: {}", other))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Memory => f.write_str("memory"),
            StorageKind::File => f.write_str("file"),
            #[cfg(feature = "sqlite")]
            StorageKind::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Open the store of the given kind rooted at `data_dir`.
pub async fn create_store(kind: StorageKind, data_dir: &Path) -> Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match kind {
        StorageKind::Memory => Arc::new(MemoryStore::new()),
        StorageKind::File => Arc::new(FileStore::new_with_path(data_dir).await?),
        #[cfg(feature = "sqlite")]
        StorageKind::Sqlite => Arc::new(SqliteStore::new_with_path(data_dir.join("headlines.db")).await?),
    };
    tracing::debug!("Opened {} store at {}", kind, data_dir.display());
    Ok(store)
}

/// Displayed and pinned ids plus the reveal cursor, persisted next to the
/// article list so user edits survive a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedView {
    pub displayed: Vec<ArticleId>,
    pub pinned: Vec<ArticleId>,
    pub cursor: usize,
}

/// Typed article cache over a [`KeyValueStore`].
#[derive(Clone)]
pub struct ArticleCache {
    store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for ArticleCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleCache").finish_non_exhaustive()
    }
}

impl ArticleCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn view_key(key: &str) -> String {
        format!("{}:view", key)
    }

    /// Overwrite the stored list under `key`.
    pub async fn save(&self, key: &str, articles: &[Article]) -> Result<()> {
        let blob = serde_json::to_string(articles)?;
        self.store.set(key, &blob).await
    }

    /// Last saved list under `key`; empty when nothing is stored or the blob
    /// cannot be read.
    pub async fn load(&self, key: &str) -> Vec<Article> {
        match self.try_load(key).await {
            Ok(articles) => articles.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable cache entry {}: {}", key, e);
                Vec::new()
            }
        }
    }

    pub async fn try_load(&self, key: &str) -> Result<Option<Vec<Article>>> {
        match self.store.get(key).await? {
            Some(blob) => Ok(Some(serde_json::from_str(&blob)?)),
            None => Ok(None),
        }
    }

    pub async fn save_view(&self, key: &str, view: &FeedView) -> Result<()> {
        let blob = serde_json::to_string(view)?;
        self.store.set(&Self::view_key(key), &blob).await
    }

    pub async fn load_view(&self, key: &str) -> Option<FeedView> {
        let blob = match self.store.get(&Self::view_key(key)).await {
            Ok(blob) => blob?,
            Err(e) => {
                tracing::warn!("Ignoring unreadable feed view for {}: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&blob) {
            Ok(view) => Some(view),
            Err(e) => {
                tracing::warn!("Ignoring corrupt feed view for {}: {}", key, e);
                None
            }
        }
    }

    /// Drop both the article list and the view stored under `key`.
    pub async fn clear(&self, key: &str) -> Result<()> {
        self.store.remove(key).await?;
        self.store.remove(&Self::view_key(key)).await
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_store, ArticleCache, FeedView, StorageKind};
}
