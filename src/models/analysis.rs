use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::NewsItem;

/// Coarse policy slant derived from analysis text by keyword heuristic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FedSentiment {
    Hawkish,
    Dovish,
    Neutral,
}

impl std::fmt::Display for FedSentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FedSentiment::Hawkish => write!(f, "hawkish"),
            FedSentiment::Dovish => write!(f, "dovish"),
            FedSentiment::Neutral => write!(f, "neutral"),
        }
    }
}

/// Which path produced an analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnalysisOrigin {
    #[default]
    Model,
    Fallback,
}

/// One persona's take on one article.
///
/// `sentiment` and `conviction` are presentation heuristics. Conviction is a
/// random display score, not a calibrated confidence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentAnalysis {
    pub agent_name: String,
    #[serde(rename = "analysis")]
    pub analysis_text: String,
    pub sentiment: FedSentiment,
    pub conviction: u32,
    pub key_points: Vec<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip)]
    pub origin: AnalysisOrigin,
}

/// Payload returned by `/fed-news-analysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub news: Vec<NewsItem>,
    pub analyses: Vec<AgentAnalysis>,
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
