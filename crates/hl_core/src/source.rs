use async_trait::async_trait;
use crate::types::Article;
use crate::Result;

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Human readable name used in logs
    fn name(&self) -> &str;

    /// Fetch the current article list, surfacing any failure
    async fn try_fetch(&self) -> Result<Vec<Article>>;

    /// Fetch the current article list; any failure yields an empty list
    async fn fetch(&self) -> Vec<Article> {
        match self.try_fetch().await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::warn!("Fetching from {} failed: {}", self.name(), e);
                Vec::new()
            }
        }
    }
}
