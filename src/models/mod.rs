mod analysis;
mod news;
mod newsletter;
mod persona;

pub use analysis::{AgentAnalysis, AnalysisOrigin, AnalysisResponse, FedSentiment};
pub use news::{NewsInsight, NewsItem, Publisher};
pub use newsletter::{NewsletterRequest, NewsletterResponse, Subscription};
pub use persona::{AgentPersona, PERSONAS};
