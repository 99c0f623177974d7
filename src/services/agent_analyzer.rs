use chrono::Utc;
use rand::Rng;
use regex::Regex;
use std::ops::Range;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::{AgentAnalysis, AgentPersona, AnalysisOrigin, FedSentiment, NewsItem, PERSONAS};
use crate::services::llm_service::{CompletionRequest, LlmService};
use crate::services::rate_limiter::RateLimiter;

/// Display-only conviction range for model-produced analyses
pub const MODEL_CONVICTION: Range<u32> = 60..95;
/// Display-only conviction range for fallback analyses
pub const FALLBACK_CONVICTION: Range<u32> = 70..90;

const MAX_KEY_POINTS: usize = 3;
const MIN_KEY_POINT_CHARS: usize = 15;

// Plain substring scan: "increase" counts as dovish, same as "eased".
static HAWKISH_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:hawkish|tighten|raise rates)").expect("hawkish pattern is valid")
});
static DOVISH_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:dovish|ease|cut rates)").expect("dovish pattern is valid")
});

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Number of leading articles analyzed per run
    pub articles_per_run: usize,
    /// Minimum interval between successive completion calls
    pub pacing: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            articles_per_run: 3,
            pacing: Duration::from_secs(1),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            articles_per_run: defaults.articles_per_run,
            pacing: std::env::var("ANALYSIS_PACING_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.pacing),
        }
    }
}

/// Runs every persona over the leading articles, one completion call at a
/// time.
pub struct AgentAnalyzer {
    llm: Arc<LlmService>,
    config: AnalyzerConfig,
}

impl AgentAnalyzer {
    pub fn new(llm: Arc<LlmService>, config: AnalyzerConfig) -> Self {
        Self { llm, config }
    }

    /// Produce one analysis per (article, persona) pair for the first
    /// `articles_per_run` items, articles outer and personas inner.
    ///
    /// Never fails: a failed completion call yields a fallback entry for that
    /// pair only.
    pub async fn analyze(&self, items: &[NewsItem]) -> Vec<AgentAnalysis> {
        let selected = &items[..items.len().min(self.config.articles_per_run)];
        info!(
            "Starting agent analyses: {} articles x {} personas",
            selected.len(),
            PERSONAS.len()
        );

        // Pacing is per invocation so concurrent requests never wait on each other
        let limiter = RateLimiter::new(self.config.pacing);
        let mut analyses = Vec::with_capacity(selected.len() * PERSONAS.len());

        for article in selected {
            for persona in PERSONAS.iter() {
                limiter.acquire().await;
                analyses.push(self.analyze_pair(article, persona).await);
            }
        }

        let fallbacks = analyses
            .iter()
            .filter(|a| a.origin == AnalysisOrigin::Fallback)
            .count();
        info!("Generated {} agent analyses ({} fallback)", analyses.len(), fallbacks);
        analyses
    }

    async fn analyze_pair(&self, article: &NewsItem, persona: &AgentPersona) -> AgentAnalysis {
        info!(
            "Generating {} analysis for article: {}",
            persona.name,
            article.title.chars().take(50).collect::<String>()
        );

        match self.llm.generate_completion(build_request(article, persona)).await {
            Ok(text) => {
                let analysis = build_analysis(persona, text, AnalysisOrigin::Model);
                debug!("{} reads the article as {}", persona.name, analysis.sentiment);
                analysis
            }
            Err(e) => {
                warn!("Error analyzing with {}: {}", persona.name, e);
                build_analysis(persona, fallback_text(persona), AnalysisOrigin::Fallback)
            }
        }
    }
}

/// Build the completion request for one (article, persona) pair.
pub fn build_request(article: &NewsItem, persona: &AgentPersona) -> CompletionRequest {
    let system = format!(
        "You are a professional {} financial analyst specializing in Federal Reserve policy analysis for institutional clients.",
        persona.description
    );

    let user = format!(
        r#"You are a {persona} analyzing Federal Reserve related news.

Article: "{title}"
Description: "{description}"

Provide a brief analysis focusing on:
1. Market implications for bonds, equities, and currencies
2. Federal Reserve policy implications
3. Your {slant} perspective on monetary policy
4. Specific actionable trading insights

Keep response under 150 words and be specific about financial market implications."#,
        persona = persona.description,
        title = article.title,
        description = article.summary,
        slant = persona.description.to_lowercase(),
    );

    CompletionRequest { system, user }
}

/// Text substituted when the completion call for a pair fails.
pub fn fallback_text(persona: &AgentPersona) -> String {
    format!(
        "{} analysis: Current Fed communications suggest continued focus on data dependency. Market positioning should consider potential policy pivots based on incoming economic indicators.",
        persona.name
    )
}

fn build_analysis(persona: &AgentPersona, text: String, origin: AnalysisOrigin) -> AgentAnalysis {
    AgentAnalysis {
        agent_name: persona.name.to_string(),
        sentiment: derive_sentiment(&text),
        conviction: synthetic_conviction(origin),
        key_points: extract_key_points(&text),
        analysis_text: text,
        timestamp: Utc::now(),
        origin,
    }
}

/// Keyword heuristic: hawkish tokens first, then dovish, else neutral.
pub fn derive_sentiment(text: &str) -> FedSentiment {
    if HAWKISH_TOKENS.is_match(text) {
        FedSentiment::Hawkish
    } else if DOVISH_TOKENS.is_match(text) {
        FedSentiment::Dovish
    } else {
        FedSentiment::Neutral
    }
}

/// Random display score; not a measured confidence.
pub fn synthetic_conviction(origin: AnalysisOrigin) -> u32 {
    let range = match origin {
        AnalysisOrigin::Model => MODEL_CONVICTION,
        AnalysisOrigin::Fallback => FALLBACK_CONVICTION,
    };
    rand::rng().random_range(range)
}

/// First three period-delimited fragments longer than 15 characters.
pub fn extract_key_points(text: &str) -> Vec<String> {
    text.split('.')
        .map(str::trim)
        .filter(|fragment| fragment.chars().count() > MIN_KEY_POINT_CHARS)
        .take(MAX_KEY_POINTS)
        .map(String::from)
        .collect()
}
