use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::time::Duration;
use thiserror::Error;

use crate::models::ErrorBody;

#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    #[error("Rate limit exceeded. Try again later.")]
    RateLimited { retry_after: Duration },

    #[error("Idea must not be empty")]
    EmptyIdea,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No healthy API keys available")]
    NoHealthyKey,

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Provider returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No suggestions generated")]
    NoSuggestions,

    #[error("No image generated")]
    NoImage,

    #[error("Failed to queue request")]
    QueueClosed,

    #[error("Worker failed to respond")]
    WorkerDropped,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::EmptyIdea => StatusCode::BAD_REQUEST,
            GatewayError::NoHealthyKey => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Transport(_)
            | GatewayError::Upstream { .. }
            | GatewayError::Parse(_)
            | GatewayError::NoSuggestions
            | GatewayError::NoImage => StatusCode::BAD_GATEWAY,
            GatewayError::Config(_) | GatewayError::QueueClosed | GatewayError::WorkerDropped => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Parse(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorBody {
            success: false,
            error: self.to_string(),
        });

        let mut response = (status, body).into_response();

        if let GatewayError::RateLimited { retry_after: wait } = self {
            // round up so clients never retry a moment too early
            let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
            if let Ok(value) = HeaderValue::from_str(&secs.max(1).to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}
