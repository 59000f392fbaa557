use axum::{Json, extract::State};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::info;

use crate::error::GatewayError;
use crate::handlers::user::UserKey;
use crate::metrics::{RATE_LIMITED, REQUEST_LATENCY, REQUEST_TOTAL, THROTTLED_USERS};
use crate::models::{BatchedRequest, IdeaRequest, ImageResponse, Job, JobOutput, SuggestResponse};
use crate::state::AppState;

// Rate limit check - counts the request against the user's sliding window
fn check_rate_limit(state: &AppState, user: &str) -> Result<(), GatewayError> {
    let decision = state.throttle.try_admit_with_wait(user);
    THROTTLED_USERS.set(state.throttle.tracked_users() as f64);

    decision.map_err(|retry_after| {
        RATE_LIMITED.inc();
        info!("Rate limit hit for user {:?}", user);
        GatewayError::RateLimited { retry_after }
    })
}

// Queue the job and wait for the worker's answer
async fn dispatch(state: &AppState, job: Job) -> Result<JobOutput, GatewayError> {
    let start_time = Instant::now();
    let (response_tx, response_rx) = oneshot::channel();

    state
        .batch_tx
        .send(BatchedRequest { job, response_tx })
        .await
        .map_err(|_| GatewayError::QueueClosed)?;

    let result = response_rx.await.map_err(|_| GatewayError::WorkerDropped)?;

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    result
}

fn accept(state: &AppState, user: &UserKey, payload: IdeaRequest) -> Result<String, GatewayError> {
    REQUEST_TOTAL.inc();
    check_rate_limit(state, user.as_str())?;

    let idea = payload.idea.trim();
    if idea.is_empty() {
        return Err(GatewayError::EmptyIdea);
    }
    Ok(idea.to_string())
}

pub async fn suggest_handler(
    State(state): State<Arc<AppState>>,
    user: UserKey,
    Json(payload): Json<IdeaRequest>,
) -> Result<Json<SuggestResponse>, GatewayError> {
    let idea = accept(&state, &user, payload)?;

    match dispatch(&state, Job::Suggest { idea }).await? {
        JobOutput::Suggestions(suggestions) => Ok(Json(SuggestResponse {
            success: true,
            suggestions,
        })),
        JobOutput::ImageUrl(_) => Err(GatewayError::NoSuggestions),
    }
}

pub async fn image_handler(
    State(state): State<Arc<AppState>>,
    user: UserKey,
    Json(payload): Json<IdeaRequest>,
) -> Result<Json<ImageResponse>, GatewayError> {
    let idea = accept(&state, &user, payload)?;

    match dispatch(&state, Job::Image { idea }).await? {
        JobOutput::ImageUrl(image) => Ok(Json(ImageResponse {
            success: true,
            image,
        })),
        JobOutput::Suggestions(_) => Err(GatewayError::NoImage),
    }
}
