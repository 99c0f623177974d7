use axum::extract::State;
use axum::http::Method;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::models::AnalysisResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(run_analysis).post(run_analysis))
}

/// GET|POST /fed-news-analysis
///
/// Fetches Fed-related news and runs every analyst persona over the leading
/// articles. Always answers 200; degraded runs carry fallback content and,
/// for pipeline faults, an `error` field.
async fn run_analysis(method: Method, State(state): State<AppState>) -> Json<AnalysisResponse> {
    info!("{} /fed-news-analysis - Fed news analysis requested", method);

    let response = state.pipeline.run().await;

    info!(
        "Fed news analysis returned {} articles and {} analyses",
        response.news.len(),
        response.analyses.len()
    );
    Json(response)
}
