//! HTTP handlers for feedback intake
//!
//! - POST /feedback: redact and store one submission
//! - GET  /health: liveness

use crate::core::intake::{FeedbackService, SubmissionOutcome};
use crate::domain::{FeedbackSubmission, RecordId};
use crate::server::error::{ApiError, ApiFailure};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state for intake handlers
#[derive(Clone)]
pub struct IntakeState {
    pub service: Arc<FeedbackService>,
}

/// Create the intake router
pub fn intake_router(state: IntakeState) -> Router {
    Router::new()
        .route("/feedback", post(submit_feedback))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Response for an accepted submission
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted: Option<bool>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// POST /feedback
async fn submit_feedback(
    State(state): State<IntakeState>,
    payload: Result<Json<FeedbackSubmission>, JsonRejection>,
) -> Response {
    let submission = match payload {
        Ok(Json(submission)) => submission,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiError::bad_request(rejection.body_text())),
            )
                .into_response()
        }
    };

    match state.service.submit(submission).await {
        Ok(SubmissionOutcome::Stored(id)) => (
            StatusCode::CREATED,
            Json(SubmitResponse {
                success: true,
                record_id: Some(id),
                accepted: None,
            }),
        )
            .into_response(),
        Ok(SubmissionOutcome::Accepted) => (
            StatusCode::ACCEPTED,
            Json(SubmitResponse {
                success: true,
                record_id: None,
                accepted: Some(true),
            }),
        )
            .into_response(),
        Err(err) => {
            crate::log_error_with_context!(&err, "Feedback submission failed");
            ApiFailure::from(err).into_response()
        }
    }
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}
