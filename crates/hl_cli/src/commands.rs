use std::fmt::Write as _;
use std::str::FromStr;

use clap::Subcommand;
use hl_core::{ArticleId, Topic};
use hl_feed::{FeedManager, FeedState, InitOutcome, RefreshOutcome, RevealTimer};
use hl_storage::ArticleCache;

use crate::duration::HumanDuration;
use crate::logging::Logger;

#[derive(Subcommand, Debug, Clone)]
pub enum FeedCommands {
    /// Show the feed, fetching it first if nothing is cached
    Feed,
    /// Fetch a fresh list, replacing the cached one and clearing pins
    Refresh,
    /// Pin an article to the top of the feed
    Pin {
        /// 1-based position in the feed, or the article title
        selector: Selector,
    },
    /// Delete an article from the feed
    Delete {
        /// 1-based position in the feed, or the article title
        selector: Selector,
    },
    /// Keep the feed on screen, revealing more articles periodically
    Watch {
        /// Reveal interval (e.g. 10s, 1m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// List the preset topics
    Topics,
    /// Forget the cached articles and pins for the topic
    Clear,
}

/// How the user points at an article on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Position(usize),
    Title(String),
}

impl FromStr for Selector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Selector must not be empty".to_string());
        }
        match s.parse::<usize>() {
            Ok(0) => Err("Positions start at 1".to_string()),
            Ok(position) => Ok(Selector::Position(position)),
            Err(_) => Ok(Selector::Title(s.to_string())),
        }
    }
}

impl Selector {
    pub fn resolve(&self, state: &FeedState) -> Option<ArticleId> {
        match self {
            Selector::Position(position) => state
                .rendered()
                .get(position - 1)
                .map(|article| article.id.clone()),
            Selector::Title(title) => state.find_by_title(title).map(|article| article.id.clone()),
        }
    }
}

pub fn render(state: &FeedState, topic: &Topic) -> String {
    let rendered = state.rendered();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "📰 {} | {} shown, {} pinned, {} waiting",
        topic.name,
        rendered.len(),
        state.pinned().len(),
        state.unrevealed()
    );

    for (i, article) in rendered.iter().enumerate() {
        let marker = if state.is_pinned(&article.id) { "📌 " } else { "" };
        let _ = writeln!(out, "{:>3}. {}{}", i + 1, marker, article.display_title());

        let mut details = Vec::new();
        if let Some(source) = article.source_name.as_deref() {
            details.push(source.to_string());
        }
        if let Some(author) = article.author.as_deref() {
            details.push(author.to_string());
        }
        if let Some(published) = article.published() {
            details.push(published.format("%Y-%m-%d %H:%M UTC").to_string());
        }
        if !details.is_empty() {
            let _ = writeln!(out, "       {}", details.join(" · "));
        }
    }
    out
}

async fn show(feed: &FeedManager, topic: &Topic) {
    println!("{}", render(&*feed.state().await, topic));
    if let Some(error) = feed.error().await {
        eprintln!("⚠️ {} (run `hl refresh` to retry)", error);
    }
}

fn report_refresh(outcome: &RefreshOutcome, logger: &Logger) {
    match outcome {
        RefreshOutcome::Refreshed(count) => logger.info(&format!("🗞️ Fetched {} articles", count)),
        RefreshOutcome::AlreadyRunning => logger.debug("Refresh already running"),
        RefreshOutcome::Failed(e) => logger.warn(&format!("⚠️ {}", e)),
    }
}

async fn initialize(feed: &FeedManager, logger: &Logger) {
    match feed.initialize().await {
        InitOutcome::Cached { articles, restored_view } => logger.debug(&format!(
            "Loaded {} cached articles (view restored: {})",
            articles, restored_view
        )),
        InitOutcome::Fetched(outcome) => report_refresh(&outcome, logger),
    }
}

async fn select(feed: &FeedManager, selector: &Selector, logger: &Logger) -> anyhow::Result<ArticleId> {
    initialize(feed, logger).await;
    let id = selector.resolve(&*feed.state().await);
    id.ok_or_else(|| anyhow::anyhow!("No article matches {:?}", selector))
}

pub async fn handle_command(
    command: FeedCommands,
    feed: &FeedManager,
    cache: &ArticleCache,
    topic: &Topic,
    logger: &Logger,
) -> anyhow::Result<()> {
    match command {
        FeedCommands::Feed => {
            initialize(feed, logger).await;
            show(feed, topic).await;
        }
        FeedCommands::Refresh => {
            let outcome = feed.refresh().await;
            report_refresh(&outcome, logger);
            if matches!(outcome, RefreshOutcome::Failed(_)) {
                // Show whatever is cached
                feed.restore().await;
            }
            show(feed, topic).await;
        }
        FeedCommands::Pin { selector } => {
            let id = select(feed, &selector, logger).await?;
            if feed.pin(&id).await {
                logger.info("📌 Pinned");
            } else {
                logger.info("Already pinned");
            }
            show(feed, topic).await;
        }
        FeedCommands::Delete { selector } => {
            let id = select(feed, &selector, logger).await?;
            feed.delete(&id).await;
            logger.info("🗑️ Deleted");
            show(feed, topic).await;
        }
        FeedCommands::Watch { interval } => {
            initialize(feed, logger).await;
            show(feed, topic).await;

            let period = interval.map_or(feed.config().reveal_interval, |i| i.0);
            logger.info(&format!(
                "👀 Revealing {} more every {}s, Ctrl-C to stop",
                feed.config().reveal_batch,
                period.as_secs()
            ));
            let mut revisions = feed.subscribe();
            let mut timer = RevealTimer::spawn(feed.clone(), period);
            loop {
                tokio::select! {
                    changed = revisions.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        show(feed, topic).await;
                    }
                    _ = tokio::signal::ctrl_c() => {
                        logger.info("👋 Stopping");
                        break;
                    }
                }
            }
            timer.cancel();
        }
        FeedCommands::Topics => {
            println!("Available topics:");
            for preset in Topic::presets() {
                println!("  {:<8} q={:<10} sortBy={}", preset.name, preset.query, preset.sort_by);
            }
        }
        FeedCommands::Clear => {
            cache.clear(feed.key()).await?;
            logger.info(&format!("🧹 Cleared cached articles under {}", feed.key()));
        }
    }
    Ok(())
}
