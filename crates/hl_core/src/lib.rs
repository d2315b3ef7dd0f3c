pub mod error;
pub mod source;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use source::NewsSource;
pub use storage::KeyValueStore;
pub use types::{Article, ArticleId, SortBy, Topic, DEFAULT_CACHE_KEY, REMOVED_TITLE};
