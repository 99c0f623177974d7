use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use tracing::{error, info, warn};

use crate::errors::NewsError;
use crate::models::{NewsInsight, NewsItem, Publisher};
use crate::secrets::ApiKey;

/// Terms that mark an article as Fed-related. Matched case-insensitively on
/// whole words.
pub const FED_KEYWORDS: &[&str] = &[
    "federal reserve",
    "fed",
    "fomc",
    "jerome powell",
    "interest rate",
    "interest rates",
    "monetary policy",
    "inflation",
    "unemployment",
];

static FED_KEYWORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = FED_KEYWORDS
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives)).expect("keyword pattern is valid")
});

/// Configuration for news service
#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub api_key: Option<ApiKey>,
    pub base_url: String,
    /// Number of articles requested from the provider
    pub batch_size: usize,
    /// Number of Fed-related articles kept after filtering
    pub max_items: usize,
    pub timeout: std::time::Duration,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.polygon.io".to_string(),
            batch_size: 50,
            max_items: 10,
            timeout: std::time::Duration::from_secs(30),
        }
    }
}

impl NewsConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: ApiKey::from_env("NEWS_API_KEY"),
            base_url: std::env::var("NEWS_API_BASE_URL").unwrap_or(defaults.base_url),
            batch_size: std::env::var("NEWS_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.batch_size),
            max_items: defaults.max_items,
            timeout: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(std::time::Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

/// Provider-shaped article record. Every field is optional because the
/// provider is untrusted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArticle {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub article_url: Option<String>,
    pub published_utc: Option<String>,
    pub publisher: Option<RawPublisher>,
    pub tickers: Option<Vec<String>>,
    pub insights: Option<Vec<RawInsight>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPublisher {
    pub name: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInsight {
    pub sentiment: Option<String>,
    pub sentiment_reasoning: Option<String>,
}

/// Trait for news providers
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Fetch the most recent articles, newest first.
    async fn fetch_latest(&self, limit: usize) -> Result<Vec<RawArticle>, NewsError>;
}

/// Polygon.io reference news provider
pub struct PolygonProvider {
    api_key: ApiKey,
    base_url: String,
    client: Client,
}

impl PolygonProvider {
    pub fn new(api_key: ApiKey, base_url: String, timeout: std::time::Duration) -> Result<Self, NewsError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NewsError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PolygonResponse {
    status: Option<String>,
    results: Option<Vec<RawArticle>>,
}

#[async_trait]
impl NewsProvider for PolygonProvider {
    async fn fetch_latest(&self, limit: usize) -> Result<Vec<RawArticle>, NewsError> {
        let url = format!("{}/v2/reference/news", self.base_url);
        info!("Fetching latest news from Polygon: {} (limit={})", url, limit);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("order", "desc".to_string()),
                ("limit", limit.to_string()),
                ("sort", "published_utc".to_string()),
                ("apiKey", self.api_key.expose().to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                // The request URL carries the API key
                let e = e.without_url();
                error!("Polygon API request failed: {}", e);
                NewsError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Polygon API error {}", status);
            return Err(NewsError::Status(status.as_u16()));
        }

        let body: PolygonResponse = response.json().await.map_err(|e| {
            let e = e.without_url();
            error!("Failed to parse Polygon response: {}", e);
            NewsError::Parse(e.to_string())
        })?;

        let articles = body.results.unwrap_or_default();
        info!(
            "Polygon response status: {} ({} articles)",
            body.status.as_deref().unwrap_or("unknown"),
            articles.len()
        );
        Ok(articles)
    }
}

/// Fetches and filters Fed-related news. Never fails: provider faults are
/// replaced with a small fixed list.
pub struct NewsService {
    config: NewsConfig,
    provider: Option<Arc<dyn NewsProvider>>,
}

impl NewsService {
    pub fn new(config: NewsConfig) -> Self {
        let provider: Option<Arc<dyn NewsProvider>> = match &config.api_key {
            Some(api_key) => {
                match PolygonProvider::new(api_key.clone(), config.base_url.clone(), config.timeout) {
                    Ok(provider) => {
                        info!("Initializing Polygon news provider");
                        Some(Arc::new(provider))
                    }
                    Err(e) => {
                        warn!("Failed to initialize news provider: {}", e);
                        None
                    }
                }
            }
            None => {
                warn!("NEWS_API_KEY not configured; serving fallback news");
                None
            }
        };

        Self { config, provider }
    }

    pub fn with_provider(config: NewsConfig, provider: Arc<dyn NewsProvider>) -> Self {
        Self {
            config,
            provider: Some(provider),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Fetch up to `max_items` Fed-related articles.
    ///
    /// An empty provider batch yields an empty list; any provider fault
    /// yields [`fallback_news`].
    pub async fn fetch(&self) -> Vec<NewsItem> {
        match self.try_fetch().await {
            Ok(items) => items,
            Err(e) => {
                error!("Error fetching Fed news, using fallback list: {}", e);
                fallback_news()
            }
        }
    }

    async fn try_fetch(&self) -> Result<Vec<NewsItem>, NewsError> {
        let provider = self.provider.as_ref().ok_or(NewsError::Disabled)?;
        let articles = provider.fetch_latest(self.config.batch_size).await?;

        if articles.is_empty() {
            info!("No news articles found, returning empty list");
            return Ok(Vec::new());
        }

        let total = articles.len();
        let items = filter_fed_related(articles, self.config.max_items);
        info!("Fed-related articles found: {} of {}", items.len(), total);
        Ok(items)
    }
}

/// Whether `text` contains a Fed keyword as a whole word.
pub fn is_fed_related(text: &str) -> bool {
    FED_KEYWORD_PATTERN.is_match(text)
}

/// Keep the first `max_items` Fed-related articles, in provider order.
pub fn filter_fed_related(articles: Vec<RawArticle>, max_items: usize) -> Vec<NewsItem> {
    articles
        .into_iter()
        .enumerate()
        .filter(|(_, article)| {
            let content = format!(
                "{} {}",
                article.title.as_deref().unwrap_or_default(),
                article.description.as_deref().unwrap_or_default()
            );
            is_fed_related(&content)
        })
        .take(max_items)
        .map(|(index, article)| to_news_item(index, article))
        .collect()
}

fn to_news_item(index: usize, article: RawArticle) -> NewsItem {
    let publisher = article.publisher.unwrap_or_default();
    NewsItem {
        id: article.id.unwrap_or_else(|| format!("article-{}", index)),
        title: article.title.unwrap_or_default(),
        summary: article.description.unwrap_or_default(),
        url: article.article_url.unwrap_or_else(|| "#".to_string()),
        published_at: parse_published(article.published_utc.as_deref()),
        publisher: Publisher {
            name: publisher.name.unwrap_or_else(|| "Unknown".to_string()),
            logo_url: publisher.logo_url,
        },
        tickers: article.tickers.unwrap_or_default(),
        insights: article
            .insights
            .unwrap_or_default()
            .into_iter()
            .map(|i| NewsInsight {
                sentiment: i.sentiment.unwrap_or_default(),
                sentiment_reasoning: i.sentiment_reasoning.unwrap_or_default(),
            })
            .collect(),
    }
}

fn parse_published(value: Option<&str>) -> DateTime<Utc> {
    match value.map(DateTime::parse_from_rfc3339) {
        Some(Ok(dt)) => dt.with_timezone(&Utc),
        Some(Err(_)) | None => {
            // Fixed sentinel keeps repeated runs over the same batch identical
            warn!("Could not parse publish time {:?}, using the Unix epoch", value);
            DateTime::<Utc>::UNIX_EPOCH
        }
    }
}

/// Canned articles served when the provider is unreachable.
pub fn fallback_news() -> Vec<NewsItem> {
    let now = Utc::now();
    vec![
        NewsItem {
            id: "mock-1".to_string(),
            title: "Fed Maintains Cautious Stance on Rate Policy Amid Economic Uncertainty".to_string(),
            summary: "Federal Reserve officials signal measured approach to future monetary policy decisions as economic indicators show mixed signals.".to_string(),
            url: "#".to_string(),
            published_at: now,
            publisher: Publisher::named("Financial News Network"),
            tickers: vec!["SPY".to_string(), "QQQ".to_string(), "TLT".to_string()],
            insights: vec![NewsInsight {
                sentiment: "neutral".to_string(),
                sentiment_reasoning: "Balanced approach to policy".to_string(),
            }],
        },
        NewsItem {
            id: "mock-2".to_string(),
            title: "Market Expectations for Fed Rate Cuts Shift Following Latest Economic Data".to_string(),
            summary: "Investors adjust their outlook on Federal Reserve policy as new employment and inflation data emerges.".to_string(),
            url: "#".to_string(),
            published_at: now - Duration::hours(1),
            publisher: Publisher::named("Market Watch"),
            tickers: vec!["IEF".to_string(), "HYG".to_string()],
            insights: vec![NewsInsight {
                sentiment: "dovish".to_string(),
                sentiment_reasoning: "Market pricing in rate cuts".to_string(),
            }],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;

    fn article(id: &str, title: &str, description: Option<&str>) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "description": description,
            "article_url": format!("https://news.example.com/{}", id),
            "published_utc": "2024-06-12T18:00:00Z",
            "publisher": { "name": "Example Wire", "logo_url": "https://news.example.com/logo.png" },
            "tickers": ["SPY", "TLT"],
            "insights": [{ "ticker": "SPY", "sentiment": "neutral", "sentiment_reasoning": "Steady" }]
        })
    }

    fn service_for(server: &MockServer) -> NewsService {
        let config = NewsConfig {
            api_key: Some(ApiKey::new("test-key")),
            base_url: server.base_url(),
            ..NewsConfig::default()
        };
        NewsService::new(config)
    }

    fn ids(items: &[NewsItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_keyword_matching_is_whole_word_and_case_insensitive() {
        assert!(is_fed_related("The FED holds steady"));
        assert!(is_fed_related("FOMC minutes released"));
        assert!(is_fed_related("Jerome Powell speaks"));
        assert!(is_fed_related("Inflation cools in May"));
        assert!(is_fed_related("Interest rates climb"));
        assert!(!is_fed_related("Federated Hermes reports earnings"));
        assert!(!is_fed_related("Fedex shares rally"));
        assert!(!is_fed_related("Disinflationary pressure in tech"));
    }

    #[test]
    fn test_filter_preserves_order_and_truncates() {
        let articles: Vec<RawArticle> = (0..15)
            .map(|i| RawArticle {
                id: Some(format!("a{}", i)),
                title: Some(format!("Fed story {}", i)),
                ..RawArticle::default()
            })
            .collect();

        let items = filter_fed_related(articles, 10);
        assert_eq!(items.len(), 10);
        assert_eq!(items[0].id, "a0");
        assert_eq!(items[9].id, "a9");
    }

    #[test]
    fn test_mapping_defaults_missing_fields() {
        let articles = vec![RawArticle {
            title: Some("Powell: the Fed is patient".to_string()),
            ..RawArticle::default()
        }];

        let items = filter_fed_related(articles, 10);
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.id, "article-0");
        assert_eq!(item.summary, "");
        assert_eq!(item.url, "#");
        assert_eq!(item.publisher.name, "Unknown");
        assert!(item.tickers.is_empty());
        assert!(item.insights.is_empty());
        assert_eq!(item.published_at, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_unparsable_publish_time_is_stable_across_runs() {
        let article = || RawArticle {
            title: Some("FOMC minutes due".to_string()),
            published_utc: Some("last Tuesday".to_string()),
            ..RawArticle::default()
        };

        let first = filter_fed_related(vec![article()], 10);
        let second = filter_fed_related(vec![article()], 10);
        assert_eq!(first[0].published_at, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(first, second);
    }

    #[test]
    fn test_description_participates_in_matching() {
        let articles = vec![RawArticle {
            id: Some("x".to_string()),
            title: Some("Markets wrap".to_string()),
            description: Some("Traders eye the FOMC decision".to_string()),
            ..RawArticle::default()
        }];
        assert_eq!(filter_fed_related(articles, 10).len(), 1);
    }

    #[test]
    fn test_fallback_news_has_two_items() {
        let items = fallback_news();
        assert_eq!(ids(&items), vec!["mock-1", "mock-2"]);
        assert!(items[1].published_at < items[0].published_at);
    }

    #[tokio::test]
    async fn test_fetch_filters_provider_batch() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/reference/news")
                    .query_param("order", "desc")
                    .query_param("limit", "50")
                    .query_param("sort", "published_utc")
                    .query_param("apiKey", "test-key");
                then.status(200).json_body(json!({
                    "status": "OK",
                    "results": [
                        article("1", "Fed signals patience", Some("Officials wait for data")),
                        article("2", "Apple unveils new phone", Some("Consumer tech")),
                        article("3", "Oil slides", None),
                        article("4", "Markets wrap", Some("Inflation data due Thursday")),
                    ]
                }));
            })
            .await;

        let items = service_for(&server).fetch().await;

        mock.assert_async().await;
        assert_eq!(ids(&items), vec!["1", "4"]);
        assert_eq!(items[0].publisher.name, "Example Wire");
        assert_eq!(items[0].tickers, vec!["SPY", "TLT"]);
        assert_eq!(items[0].insights.len(), 1);
        assert_eq!(items[0].published_at.to_rfc3339(), "2024-06-12T18:00:00+00:00");
    }

    #[tokio::test]
    async fn test_no_keyword_matches_is_empty_not_fallback() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/reference/news");
                then.status(200).json_body(json!({
                    "status": "OK",
                    "results": [article("1", "Apple unveils new phone", Some("Consumer tech"))]
                }));
            })
            .await;

        assert!(service_for(&server).fetch().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_provider_batch_is_empty_not_fallback() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/reference/news");
                then.status(200).json_body(json!({ "status": "OK", "results": [] }));
            })
            .await;

        assert!(service_for(&server).fetch().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_results_is_empty_not_fallback() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/reference/news");
                then.status(200).json_body(json!({ "status": "OK" }));
            })
            .await;

        assert!(service_for(&server).fetch().await.is_empty());
    }

    #[tokio::test]
    async fn test_http_error_yields_fallback() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/reference/news");
                then.status(503).body("unavailable");
            })
            .await;

        assert_eq!(ids(&service_for(&server).fetch().await), vec!["mock-1", "mock-2"]);
    }

    #[tokio::test]
    async fn test_malformed_body_yields_fallback() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/reference/news");
                then.status(200)
                    .header("content-type", "application/json")
                    .body("{ not json");
            })
            .await;

        assert_eq!(ids(&service_for(&server).fetch().await), vec!["mock-1", "mock-2"]);
    }

    #[tokio::test]
    async fn test_unreachable_provider_yields_fallback() {
        let config = NewsConfig {
            api_key: Some(ApiKey::new("test-key")),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: std::time::Duration::from_secs(2),
            ..NewsConfig::default()
        };

        let items = NewsService::new(config).fetch().await;
        assert_eq!(ids(&items), vec!["mock-1", "mock-2"]);
    }

    #[tokio::test]
    async fn test_missing_api_key_yields_fallback() {
        let service = NewsService::new(NewsConfig::default());
        assert!(!service.is_enabled());
        assert_eq!(ids(&service.fetch().await), vec!["mock-1", "mock-2"]);
    }
}
