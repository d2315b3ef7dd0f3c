use async_trait::async_trait;
use crate::Result;

/// Opaque blob cache keyed by string.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the blob stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the blob stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the blob stored under `key`; missing keys are not an error
    async fn remove(&self, key: &str) -> Result<()>;
}
