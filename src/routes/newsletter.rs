use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;

use crate::errors::AppError;
use crate::models::{NewsletterRequest, NewsletterResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(subscribe))
}

/// POST /send-newsletter
///
/// Records the subscription, then sends the welcome email best-effort.
async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<NewsletterRequest>,
) -> Result<Json<NewsletterResponse>, AppError> {
    info!("POST /send-newsletter - Newsletter subscription");

    let response = state.newsletter.subscribe(&request.email).await?;
    Ok(Json(response))
}
