use std::sync::Arc;

use crate::services::newsletter_service::NewsletterService;
use crate::services::pipeline::AnalysisPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnalysisPipeline>,
    pub newsletter: Arc<NewsletterService>,
}
