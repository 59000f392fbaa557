use axum::{Json, response::IntoResponse};

use crate::trending::TRENDING_IDEAS;

pub async fn trending_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "success": true,
        "ideas": TRENDING_IDEAS
    }))
}
