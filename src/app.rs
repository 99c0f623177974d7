use axum::Router;
use http::{header, HeaderName, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::{analysis, health, newsletter};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    // Browser clients send the hosted-backend headers along with auth
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ]);

    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/fed-news-analysis", analysis::router())
        .nest("/send-newsletter", newsletter::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
