#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use fed_analysis_backend::errors::{LlmError, NewsError};
use fed_analysis_backend::services::agent_analyzer::{AgentAnalyzer, AnalyzerConfig};
use fed_analysis_backend::services::llm_service::{CompletionRequest, LlmProvider, LlmService};
use fed_analysis_backend::services::news_service::{
    NewsConfig, NewsProvider, NewsService, RawArticle, RawPublisher,
};
use fed_analysis_backend::services::pipeline::AnalysisPipeline;

pub const MODEL_TEXT: &str = "Sticky services inflation argues for a hawkish hold. Two-year yields should stay elevated into the next meeting. Equities may rotate toward quality balance sheets. Keep duration short.";

/// Serves a fixed batch, or a fault when `batch` is `None`.
pub struct StubNewsProvider {
    pub batch: Option<Vec<RawArticle>>,
    pub calls: Mutex<usize>,
}

impl StubNewsProvider {
    pub fn serving(batch: Vec<RawArticle>) -> Self {
        Self {
            batch: Some(batch),
            calls: Mutex::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            batch: None,
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl NewsProvider for StubNewsProvider {
    async fn fetch_latest(&self, _limit: usize) -> Result<Vec<RawArticle>, NewsError> {
        *self.calls.lock() += 1;
        self.batch
            .clone()
            .ok_or_else(|| NewsError::Network("connection reset".to_string()))
    }
}

/// Returns `text` for every call, or fails every call when `text` is `None`.
pub struct StubLlmProvider {
    pub text: Option<String>,
    pub calls: Mutex<usize>,
}

impl StubLlmProvider {
    pub fn answering(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            calls: Mutex::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl LlmProvider for StubLlmProvider {
    async fn generate_completion(&self, _request: CompletionRequest) -> Result<String, LlmError> {
        *self.calls.lock() += 1;
        self.text
            .clone()
            .ok_or_else(|| LlmError::ApiError("HTTP 503: unavailable".to_string()))
    }
}

pub fn raw_article(id: &str, title: &str, description: Option<&str>) -> RawArticle {
    RawArticle {
        id: Some(id.to_string()),
        title: Some(title.to_string()),
        description: description.map(str::to_string),
        article_url: Some(format!("https://news.example.com/{}", id)),
        published_utc: Some("2024-06-12T18:00:00Z".to_string()),
        publisher: Some(RawPublisher {
            name: Some("Example Wire".to_string()),
            logo_url: None,
        }),
        tickers: Some(vec!["TLT".to_string()]),
        insights: None,
    }
}

/// Fifteen articles, four of them Fed-related (ids f1..f4).
pub fn mixed_batch() -> Vec<RawArticle> {
    let mut batch = Vec::new();
    for i in 0..11 {
        batch.push(raw_article(
            &format!("o{}", i),
            &format!("Company {} beats earnings estimates", i),
            Some("Shares rise after hours"),
        ));
    }
    batch.insert(1, raw_article("f1", "Fed holds rates steady", None));
    batch.insert(4, raw_article("f2", "Markets wrap", Some("Inflation expectations edge lower")));
    batch.insert(8, raw_article("f3", "FOMC minutes show division", Some("Officials split")));
    batch.push(raw_article("f4", "Jerome Powell testifies", Some("Senate banking committee")));
    batch
}

pub fn pipeline(news: Arc<StubNewsProvider>, llm: Arc<StubLlmProvider>) -> AnalysisPipeline {
    let news = NewsService::with_provider(NewsConfig::default(), news);
    let analyzer = AgentAnalyzer::new(
        Arc::new(LlmService::with_provider(llm)),
        AnalyzerConfig {
            pacing: Duration::ZERO,
            ..AnalyzerConfig::default()
        },
    );
    AnalysisPipeline::new(news, analyzer)
}
