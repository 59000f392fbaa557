pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod key_pool;
pub mod metrics;
pub mod models;
pub mod provider;
pub mod rate_limit;
pub mod state;
pub mod trending;
pub mod worker;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    health_handler, image_handler, metrics_handler, suggest_handler, trending_handler,
};
use crate::state::AppState;

// creating the router with routes
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/trending", get(trending_handler))
        .route("/suggest", post(suggest_handler))
        .route("/generate-image", post(image_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
