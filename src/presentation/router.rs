// Router construction
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{health_check, list_options, submit_insights};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/options", get(list_options))
        .route("/insights", post(submit_insights))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
