use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{error, info};

use crate::models::{
    AgentAnalysis, AnalysisOrigin, AnalysisResponse, FedSentiment, NewsItem, Publisher,
};
use crate::services::agent_analyzer::AgentAnalyzer;
use crate::services::news_service::NewsService;

/// Fetch, analyze and assemble, in that order, once per request.
pub struct AnalysisPipeline {
    news: NewsService,
    analyzer: AgentAnalyzer,
}

impl AnalysisPipeline {
    pub fn new(news: NewsService, analyzer: AgentAnalyzer) -> Self {
        Self { news, analyzer }
    }

    /// Always returns a well-formed response. A fault that escapes the stages
    /// is reported through the canned [`fallback_response`].
    pub async fn run(&self) -> AnalysisResponse {
        match AssertUnwindSafe(self.run_stages()).catch_unwind().await {
            Ok(response) => response,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("Error in fed news analysis pipeline: {}", message);
                fallback_response(message)
            }
        }
    }

    async fn run_stages(&self) -> AnalysisResponse {
        info!("Starting Fed news analysis");

        let news = self.news.fetch().await;
        info!("Fetched {} Fed news articles", news.len());

        let analyses = self.analyzer.analyze(&news).await;

        let response = assemble(news, analyses);
        info!("Fed news analysis completed successfully");
        response
    }
}

/// Wrap the stage outputs with a generation timestamp.
pub fn assemble(news: Vec<NewsItem>, analyses: Vec<AgentAnalysis>) -> AnalysisResponse {
    AnalysisResponse {
        news,
        analyses,
        last_updated: Utc::now(),
        error: None,
    }
}

/// Single-item "system updating" response carrying the fault message.
pub fn fallback_response(error: impl Into<String>) -> AnalysisResponse {
    let now = Utc::now();
    AnalysisResponse {
        news: vec![NewsItem {
            id: "fallback-1".to_string(),
            title: "Fed Policy Analysis - System Update".to_string(),
            summary: "Fed analysis system is currently updating. Displaying cached insights.".to_string(),
            url: "#".to_string(),
            published_at: now,
            publisher: Publisher::named("Fed Analysis System"),
            tickers: vec!["SPY".to_string(), "TLT".to_string()],
            insights: Vec::new(),
        }],
        analyses: vec![AgentAnalysis {
            agent_name: "System Agent".to_string(),
            analysis_text: "Fed analysis system is updating to provide the latest insights. Please check back shortly for live market analysis.".to_string(),
            sentiment: FedSentiment::Neutral,
            conviction: 85,
            key_points: vec![
                "System updating".to_string(),
                "Live data incoming".to_string(),
                "Analysis resuming shortly".to_string(),
            ],
            timestamp: now,
            origin: AnalysisOrigin::Fallback,
        }],
        last_updated: now,
        error: Some(error.into()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unknown error occurred".to_string()
    }
}
