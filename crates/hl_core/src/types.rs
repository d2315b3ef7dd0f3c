use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Title the aggregation endpoint substitutes for redacted articles.
pub const REMOVED_TITLE: &str = "[Removed]";

/// Key the article list is stored under when no topic-specific key is set.
pub const DEFAULT_CACHE_KEY: &str = "storedNews";

/// Stable identity of an article, derived from its title, source and
/// publication timestamp when it is first ingested.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    pub fn derive(title: Option<&str>, source_name: Option<&str>, published_at: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(title.unwrap_or_default().as_bytes());
        hasher.update([0u8]);
        hasher.update(source_name.unwrap_or_default().as_bytes());
        hasher.update([0u8]);
        hasher.update(published_at.as_bytes());
        let digest = hasher.finalize();
        Self(digest[..16].iter().map(|b| format!("{:02x}", b)).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: ArticleId,
    pub title: Option<String>,
    pub author: Option<String>,
    pub source_name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub published_at: String,
}

impl Article {
    pub fn new(
        title: Option<String>,
        source_name: Option<String>,
        published_at: impl Into<String>,
    ) -> Self {
        let published_at = published_at.into();
        Self {
            id: ArticleId::derive(title.as_deref(), source_name.as_deref(), &published_at),
            title,
            author: None,
            source_name,
            url: None,
            description: None,
            image_url: None,
            published_at,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// True when the endpoint redacted the article or sent it without a title.
    pub fn is_removed(&self) -> bool {
        match self.title.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(title) => title == REMOVED_TITLE,
        }
    }

    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => REMOVED_TITLE,
        }
    }

    pub fn published(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.published_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    PublishedAt,
    Popularity,
    Relevancy,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::PublishedAt => "publishedAt",
            SortBy::Popularity => "popularity",
            SortBy::Relevancy => "relevancy",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publishedAt" | "published-at" => Ok(SortBy::PublishedAt),
            "popularity" => Ok(SortBy::Popularity),
            "relevancy" => Ok(SortBy::Relevancy),
            other => Err(crate::Error::Config(format!("Unknown sort order: {}", other))),
        }
    }
}

/// A named query against the aggregation endpoint with its own stored list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub name: String,
    pub query: String,
    pub sort_by: SortBy,
    pub language: String,
    pub cache_key: String,
}

impl Topic {
    pub fn custom(name: impl Into<String>, query: impl Into<String>) -> Self {
        let name = name.into();
        // Names are free text; keys must stay usable as file names
        let slug: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        Self {
            cache_key: format!("{}News", slug),
            name,
            query: query.into(),
            sort_by: SortBy::default(),
            language: "en".to_string(),
        }
    }

    pub fn presets() -> Vec<Topic> {
        vec![
            Topic::custom("tesla", "tesla"),
            Topic::custom("apple", "apple").with_sort_by(SortBy::Popularity),
            Topic::custom("google", "google"),
        ]
    }

    pub fn preset(name: &str) -> Option<Topic> {
        Self::presets()
            .into_iter()
            .find(|topic| topic.name.eq_ignore_ascii_case(name))
    }

    pub fn with_sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_cache_key(mut self, cache_key: impl Into<String>) -> Self {
        self.cache_key = cache_key.into();
        self
    }
}

impl Default for Topic {
    fn default() -> Self {
        Topic::custom("headlines", "tesla OR apple OR google").with_cache_key(DEFAULT_CACHE_KEY)
    }
}
