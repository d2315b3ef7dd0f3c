use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use hl_core::{Article, Error, NewsSource, Result, Topic};
use reqwest::header::{self, HeaderMap, HeaderValue};
use url::Url;

pub mod response;

pub use response::{parse_articles, MAX_ARTICLES};

/// Aggregation endpoint the client talks to unless configured otherwise.
pub const DEFAULT_ENDPOINT: &str = "https://asia-south1-kc-stage-rp.cloudfunctions.net/globalNews";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct NewsClientConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub topic: Topic,
    pub from: Option<NaiveDate>,
    pub timeout: Duration,
}

impl fmt::Debug for NewsClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("topic", &self.topic)
            .field("from", &self.from)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for NewsClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            topic: Topic::default(),
            from: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl NewsClientConfig {
    pub fn new(topic: Topic) -> Self {
        Self {
            topic,
            ..Self::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_from(mut self, from: NaiveDate) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for the news aggregation endpoint. One POST per fetch, no retries.
pub struct NewsClient {
    http: reqwest::Client,
    endpoint: Url,
    config: NewsClientConfig,
}

impl fmt::Debug for NewsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsClient")
            .field("config", &self.config)
            .finish()
    }
}

impl NewsClient {
    pub fn new(config: NewsClientConfig) -> Result<Self> {
        if config.api_key.as_deref().map_or(true, |key| key.trim().is_empty()) {
            return Err(Error::Config("News API key is required".to_string()));
        }
        let endpoint = Url::parse(&config.endpoint)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { http, endpoint, config })
    }

    pub fn config(&self) -> &NewsClientConfig {
        &self.config
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        let topic = &self.config.topic;
        let from = self
            .config
            .from
            .unwrap_or_else(|| Utc::now().date_naive())
            .format("%Y-%m-%d")
            .to_string();

        vec![
            ("endpoint", "everything".to_string()),
            ("q", topic.query.clone()),
            ("from", from),
            ("sortBy", topic.sort_by.as_str().to_string()),
            ("language", topic.language.clone()),
            ("apiKey", self.config.api_key.clone().unwrap_or_default()),
        ]
    }

    /// Build the request without sending it.
    pub fn request(&self) -> Result<reqwest::Request> {
        Ok(self
            .http
            .post(self.endpoint.clone())
            .headers(Self::headers())
            .query(&self.query_params())
            .body("{}")
            .build()?)
    }
}

#[async_trait]
impl NewsSource for NewsClient {
    fn name(&self) -> &str {
        &self.config.topic.name
    }

    async fn try_fetch(&self) -> Result<Vec<Article>> {
        let request = self.request()?;
        tracing::debug!("POST {} (topic {})", self.endpoint, self.config.topic.name);

        let response = self.http.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network { status: status.as_u16() });
        }

        let body = response.text().await?;
        let articles = parse_articles(&body)?;
        tracing::debug!("Fetched {} articles for {}", articles.len(), self.config.topic.name);
        Ok(articles)
    }
}
