use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use clap::Parser;
use hl_client::{NewsClient, NewsClientConfig, DEFAULT_ENDPOINT};
use hl_core::{Article, Error, NewsSource, SortBy, Topic};
use hl_feed::{FeedConfig, FeedManager};
use hl_storage::{create_store, ArticleCache, StorageKind};

mod commands;
mod duration;
mod logging;

use commands::{handle_command, FeedCommands};
use duration::HumanDuration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headlines from the news aggregation endpoint", long_about = None)]
pub struct Cli {
    /// Storage backend: memory, file or sqlite
    #[arg(long, env = "HL_STORAGE", default_value = "file")]
    storage: String,
    /// Directory for cached articles (defaults to the platform data dir)
    #[arg(long, env = "HL_DATA_DIR")]
    data_dir: Option<PathBuf>,
    /// Topic preset (tesla, apple, google) or a custom name used with --query
    #[arg(long, short, default_value = "headlines")]
    topic: String,
    /// Search expression, may combine terms with OR
    #[arg(long, short)]
    query: Option<String>,
    #[arg(long, value_enum)]
    sort_by: Option<SortBy>,
    #[arg(long)]
    language: Option<String>,
    /// Oldest publication date to request (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    from: Option<NaiveDate>,
    #[arg(long, env = "HL_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
    #[arg(long, env = "HL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Articles shown after loading
    #[arg(long, default_value_t = 10)]
    window: usize,
    /// Articles revealed per tick
    #[arg(long, default_value_t = 5)]
    batch: usize,
    /// Time between reveal ticks
    #[arg(long, default_value = "10s")]
    reveal_interval: HumanDuration,
    /// Keep redacted articles in the feed
    #[arg(long)]
    show_removed: bool,
    #[arg(long, short)]
    verbose: bool,
    #[command(subcommand)]
    command: FeedCommands,
}

impl Cli {
    fn topic(&self) -> anyhow::Result<Topic> {
        let mut topic = match (Topic::preset(&self.topic), &self.query) {
            (Some(preset), Some(query)) => Topic { query: query.clone(), ..preset },
            (Some(preset), None) => preset,
            (None, Some(query)) => Topic::custom(&self.topic, query),
            (None, None) if self.topic == Topic::default().name => Topic::default(),
            (None, None) => anyhow::bail!(
                "Unknown topic {:?}; pass --query or pick one of `hl topics`",
                self.topic
            ),
        };
        if let Some(sort_by) = self.sort_by {
            topic = topic.with_sort_by(sort_by);
        }
        if let Some(language) = &self.language {
            topic = topic.with_language(language);
        }
        Ok(topic)
    }

    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|dir| dir.join("headlines"))
                .unwrap_or_else(|| PathBuf::from(".headlines"))
        })
    }

    fn feed_config(&self) -> FeedConfig {
        FeedConfig::default()
            .with_initial_window(self.window)
            .with_reveal_batch(self.batch)
            .with_reveal_interval(self.reveal_interval.0)
            .with_hide_removed(!self.show_removed)
    }
}

/// Stands in for the client when no API key is configured, so cached
/// feeds stay usable.
struct OfflineSource {
    name: String,
}

#[async_trait]
impl NewsSource for OfflineSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn try_fetch(&self) -> hl_core::Result<Vec<Article>> {
        Err(Error::Config("No API key configured, set HL_API_KEY".to_string()))
    }
}

fn create_source(cli: &Cli, topic: &Topic) -> anyhow::Result<Arc<dyn NewsSource>> {
    let Some(api_key) = cli.api_key.as_deref().filter(|key| !key.trim().is_empty()) else {
        tracing::warn!("⚠️ No API key configured, working from cache only");
        return Ok(Arc::new(OfflineSource { name: topic.name.clone() }));
    };

    let mut config = NewsClientConfig::new(topic.clone())
        .with_endpoint(&cli.endpoint)
        .with_api_key(api_key);
    if let Some(from) = cli.from {
        config = config.with_from(from);
    }
    Ok(Arc::new(NewsClient::new(config)?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let logger = logging::init_logging(cli.verbose);

    let topic = cli.topic()?;
    let logger = logger.with_prefix(format!("[{}]", topic.name));

    let kind: StorageKind = cli.storage.parse()?;
    let data_dir = cli.data_dir();
    let store = create_store(kind, &data_dir).await?;
    logger.debug(&format!("💾 Using {} storage at {}", kind, data_dir.display()));

    let cache = ArticleCache::new(store);
    let source = create_source(&cli, &topic)?;
    let feed = FeedManager::new(source, cache.clone(), topic.cache_key.clone(), cli.feed_config());

    handle_command(cli.command.clone(), &feed, &cache, &topic, &logger).await
}
