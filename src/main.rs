use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use fed_analysis_backend::app;
use fed_analysis_backend::logging::{init_logging, LoggingConfig};
use fed_analysis_backend::services::agent_analyzer::{AgentAnalyzer, AnalyzerConfig};
use fed_analysis_backend::services::llm_service::{LlmConfig, LlmService};
use fed_analysis_backend::services::news_service::{NewsConfig, NewsService};
use fed_analysis_backend::services::newsletter_service::{
    InMemorySubscriptionStore, NewsletterConfig, NewsletterService,
};
use fed_analysis_backend::services::pipeline::AnalysisPipeline;
use fed_analysis_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())?;

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let news = NewsService::new(NewsConfig::from_env());
    let llm = Arc::new(LlmService::new(LlmConfig::from_env()));
    if !news.is_enabled() {
        tracing::warn!("NEWS_API_KEY not set, serving fallback news");
    }
    if !llm.is_enabled() {
        tracing::warn!("LLM_API_KEY not set, serving fallback analyses");
    }
    let analyzer = AgentAnalyzer::new(llm, AnalyzerConfig::from_env());

    let newsletter = NewsletterService::from_config(
        &NewsletterConfig::from_env(),
        Arc::new(InMemorySubscriptionStore::new()),
    );

    let state = AppState {
        pipeline: Arc::new(AnalysisPipeline::new(news, analyzer)),
        newsletter: Arc::new(newsletter),
    };
    let app = app::create_app(state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Fed analysis backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
