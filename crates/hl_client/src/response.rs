use hl_core::{Article, Result};
use serde::Deserialize;

/// Only this many entries of the `articles` array are kept.
pub const MAX_ARTICLES: usize = 100;

#[derive(Debug, Deserialize)]
pub struct NewsResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "totalResults")]
    pub total_results: Option<u64>,
    pub articles: Vec<RawArticle>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawArticle {
    pub title: Option<String>,
    pub author: Option<String>,
    pub source: Option<RawSource>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        let source_name = raw.source.and_then(|s| s.name);
        let mut article = Article::new(raw.title, source_name, raw.published_at.unwrap_or_default());
        article.author = raw.author;
        article.url = raw.url;
        article.description = raw.description;
        article.image_url = raw.url_to_image;
        article
    }
}

/// Decode a response body into at most [`MAX_ARTICLES`] articles.
pub fn parse_articles(body: &str) -> Result<Vec<Article>> {
    let response: NewsResponse = serde_json::from_str(body)?;
    tracing::debug!(
        "Endpoint reported status {:?} with {:?} total results",
        response.status,
        response.total_results
    );
    Ok(response
        .articles
        .into_iter()
        .take(MAX_ARTICLES)
        .map(Article::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_articles() {
        let body = json!({
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {
                    "source": { "id": null, "name": "Electrek" },
                    "author": "Fred Lambert",
                    "title": "Tesla unveils Cybercab",
                    "description": "A robotaxi",
                    "url": "https://electrek.co/cybercab",
                    "urlToImage": "https://electrek.co/cybercab.jpg",
                    "publishedAt": "2024-10-13T10:00:00Z"
                },
                {
                    "source": { "id": null, "name": "[Removed]" },
                    "title": "[Removed]",
                    "publishedAt": "1970-01-01T00:00:00Z"
                }
            ]
        })
        .to_string();

        let articles = parse_articles(&body).unwrap();
        assert_eq!(articles.len(), 2);

        let first = &articles[0];
        assert_eq!(first.display_title(), "Tesla unveils Cybercab");
        assert_eq!(first.author.as_deref(), Some("Fred Lambert"));
        assert_eq!(first.source_name.as_deref(), Some("Electrek"));
        assert_eq!(first.image_url.as_deref(), Some("https://electrek.co/cybercab.jpg"));
        assert_eq!(first.published_at, "2024-10-13T10:00:00Z");
        assert!(!first.is_removed());
        assert!(articles[1].is_removed());
    }

    #[test]
    fn test_parse_keeps_first_hundred() {
        let articles: Vec<_> = (0..150)
            .map(|i| json!({ "title": format!("Story {}", i), "publishedAt": "2024-10-13T10:00:00Z" }))
            .collect();
        let body = json!({ "articles": articles }).to_string();

        let parsed = parse_articles(&body).unwrap();
        assert_eq!(parsed.len(), MAX_ARTICLES);
        assert_eq!(parsed[0].display_title(), "Story 0");
        assert_eq!(parsed[99].display_title(), "Story 99");
    }

    #[test]
    fn test_parse_tolerates_nulls() {
        let body = r#"{"articles":[{"title":null,"author":null,"source":null,"publishedAt":null}]}"#;
        let parsed = parse_articles(body).unwrap();
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].is_removed());
        assert_eq!(parsed[0].published_at, "");
    }

    #[test]
    fn test_parse_rejects_malformed_body() {
        assert!(parse_articles("<html>oops</html>").is_err());
        assert!(parse_articles(r#"{"status":"error","message":"rate limited"}"#).is_err());
    }
}
