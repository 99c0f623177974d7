pub mod agent_analyzer;
pub mod llm_service;
pub mod news_service;
pub mod newsletter_service;
pub mod pipeline;
pub mod rate_limiter;
