use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single Fed-related news item, as returned to the frontend.
///
/// JSON keys follow the provider's naming (`description`, `article_url`,
/// `published_utc`) so existing clients keep working.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "description")]
    pub summary: String,
    #[serde(rename = "article_url")]
    pub url: String,
    #[serde(rename = "published_utc")]
    pub published_at: DateTime<Utc>,
    pub publisher: Publisher,
    #[serde(default)]
    pub tickers: Vec<String>,
    /// Provider-computed insights. Passed through untouched; the analysis
    /// stage derives its own sentiment.
    #[serde(default)]
    pub insights: Vec<NewsInsight>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Publisher {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl Publisher {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            logo_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsInsight {
    pub sentiment: String,
    pub sentiment_reasoning: String,
}
