use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hl_core::{Article, ArticleId, NewsSource};
use hl_storage::ArticleCache;
use thiserror::Error;
use tokio::sync::{watch, RwLock, RwLockReadGuard};

use crate::config::FeedConfig;
use crate::state::FeedState;

/// User-visible reason the last load or refresh produced nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("Could not load news: {0}")]
    Network(String),

    #[error("No articles available right now")]
    NoArticles,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed(usize),
    AlreadyRunning,
    Failed(FeedError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Cached { articles: usize, restored_view: bool },
    Fetched(RefreshOutcome),
}

#[derive(Debug, Default)]
struct Shared {
    feed: FeedState,
    error: Option<FeedError>,
}

/// Releases the refresh token when the refresh finishes or is dropped.
struct RefreshGuard<'a>(&'a AtomicBool);

impl<'a> RefreshGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct Inner {
    source: Arc<dyn NewsSource>,
    cache: ArticleCache,
    key: String,
    config: FeedConfig,
    shared: RwLock<Shared>,
    refreshing: AtomicBool,
    revision: watch::Sender<u64>,
}

/// Owns a topic's feed: merges fetched articles with pins and deletions and
/// keeps the cache in step. Cloning yields another handle to the same feed.
#[derive(Clone)]
pub struct FeedManager {
    inner: Arc<Inner>,
}

impl FeedManager {
    pub fn new(
        source: Arc<dyn NewsSource>,
        cache: ArticleCache,
        key: impl Into<String>,
        config: FeedConfig,
    ) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                source,
                cache,
                key: key.into(),
                config,
                shared: RwLock::new(Shared::default()),
                refreshing: AtomicBool::new(false),
                revision,
            }),
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.inner.config
    }

    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Load the cached list, falling back to a refresh when nothing is stored.
    pub async fn initialize(&self) -> InitOutcome {
        match self.restore().await {
            Some(outcome) => outcome,
            None => {
                tracing::info!("No cached articles under {}, fetching", self.inner.key);
                InitOutcome::Fetched(self.refresh().await)
            }
        }
    }

    /// Load the cached list and view without touching the network. Returns
    /// `None` when nothing is cached.
    pub async fn restore(&self) -> Option<InitOutcome> {
        let cached = self.inner.cache.load(&self.inner.key).await;
        if cached.is_empty() {
            return None;
        }

        let view = self.inner.cache.load_view(&self.inner.key).await;
        let window = self.inner.config.initial_window;
        let articles = cached.len();
        let mut shared = self.inner.shared.write().await;
        let restored_view = match view {
            Some(view) => shared.feed.restore(cached, &view, window),
            None => {
                shared.feed.seed(cached, window);
                false
            }
        };
        drop(shared);
        self.bump();

        tracing::debug!(
            "Loaded {} cached articles under {} (view restored: {})",
            articles,
            self.inner.key,
            restored_view
        );
        Some(InitOutcome::Cached { articles, restored_view })
    }

    /// Fetch a fresh list and replace the feed with it. Failures leave the
    /// feed untouched and set the error flag; a refresh started while another
    /// is running is ignored.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Some(_guard) = RefreshGuard::acquire(&self.inner.refreshing) else {
            tracing::debug!("Refresh already in flight for {}", self.inner.key);
            return RefreshOutcome::AlreadyRunning;
        };

        let fetched = match self.inner.source.try_fetch().await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::warn!("Refreshing {} failed: {}", self.inner.source.name(), e);
                return self.fail(FeedError::Network(e.to_string())).await;
            }
        };

        let articles: Vec<Article> = if self.inner.config.hide_removed {
            fetched.into_iter().filter(|a| !a.is_removed()).collect()
        } else {
            fetched
        };
        if articles.is_empty() {
            return self.fail(FeedError::NoArticles).await;
        }

        let mut shared = self.inner.shared.write().await;
        shared.feed.seed(articles, self.inner.config.initial_window);
        shared.error = None;
        let count = shared.feed.all().len();

        if let Err(e) = self.inner.cache.save(&self.inner.key, shared.feed.all()).await {
            tracing::warn!("Failed to store articles under {}: {}", self.inner.key, e);
        }
        self.persist_view(&shared.feed).await;
        drop(shared);
        self.bump();

        RefreshOutcome::Refreshed(count)
    }

    /// Reveal the next batch of stored articles. Returns how many appeared.
    pub async fn reveal_more(&self) -> usize {
        let mut shared = self.inner.shared.write().await;
        let revealed = shared.feed.reveal_more(self.inner.config.reveal_batch);
        if revealed > 0 {
            self.persist_view(&shared.feed).await;
            drop(shared);
            self.bump();
        }
        revealed
    }

    pub async fn pin(&self, id: &ArticleId) -> bool {
        let mut shared = self.inner.shared.write().await;
        let pinned = shared.feed.pin(id);
        if pinned {
            self.persist_view(&shared.feed).await;
            drop(shared);
            self.bump();
        }
        pinned
    }

    pub async fn delete(&self, id: &ArticleId) -> bool {
        let mut shared = self.inner.shared.write().await;
        let deleted = shared.feed.delete(id);
        if deleted {
            if let Err(e) = self.inner.cache.save(&self.inner.key, shared.feed.all()).await {
                tracing::warn!("Failed to store articles under {}: {}", self.inner.key, e);
            }
            self.persist_view(&shared.feed).await;
            drop(shared);
            self.bump();
        }
        deleted
    }

    /// Read access to the current feed.
    pub async fn state(&self) -> RwLockReadGuard<'_, FeedState> {
        RwLockReadGuard::map(self.inner.shared.read().await, |shared| &shared.feed)
    }

    /// Articles in render order.
    pub async fn rendered(&self) -> Vec<Article> {
        self.state().await.rendered().into_iter().cloned().collect()
    }

    pub async fn error(&self) -> Option<FeedError> {
        self.inner.shared.read().await.error.clone()
    }

    pub async fn clear_error(&self) {
        let mut shared = self.inner.shared.write().await;
        if shared.error.take().is_some() {
            drop(shared);
            self.bump();
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.refreshing.load(Ordering::Acquire)
    }

    /// Receiver whose value changes after every mutation of the feed.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    async fn fail(&self, error: FeedError) -> RefreshOutcome {
        self.inner.shared.write().await.error = Some(error.clone());
        self.bump();
        RefreshOutcome::Failed(error)
    }

    async fn persist_view(&self, feed: &FeedState) {
        if let Err(e) = self.inner.cache.save_view(&self.inner.key, &feed.view()).await {
            tracing::warn!("Failed to store feed view for {}: {}", self.inner.key, e);
        }
    }

    fn bump(&self) {
        self.inner.revision.send_modify(|revision| *revision += 1);
    }
}
