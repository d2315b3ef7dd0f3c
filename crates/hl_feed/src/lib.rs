pub mod config;
pub mod manager;
pub mod state;
pub mod timer;

pub use config::FeedConfig;
pub use manager::{FeedError, FeedManager, InitOutcome, RefreshOutcome};
pub use state::FeedState;
pub use timer::RevealTimer;

pub mod prelude {
    pub use super::{FeedConfig, FeedError, FeedManager, FeedState, RefreshOutcome, RevealTimer};
    pub use hl_core::{Article, ArticleId, Result, Error};
}
