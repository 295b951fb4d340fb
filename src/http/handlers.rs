use super::state::AppState;
use crate::error::SessionError;
use crate::scenario::ScenarioConfig;
use crate::session::SessionSummary;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct FeedbackAreaRequest {
    pub area: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    /// Absent when no conversation was running
    pub summary: Option<SessionSummary>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(err: SessionError) -> Response {
    let status = match err {
        SessionError::IncompleteScenario
        | SessionError::EmptyMessage
        | SessionError::InvalidFeedbackArea => StatusCode::BAD_REQUEST,
        SessionError::InvalidTransition { .. }
        | SessionError::NotConnected
        | SessionError::SendInFlight
        | SessionError::EmptyTranscript
        | SessionError::ScenarioFrozen => StatusCode::CONFLICT,
        SessionError::Closed => {
            error!("Session runtime is not running");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// Reply with the session as it is after an operation
async fn snapshot_response(state: &AppState) -> Response {
    match state.session.snapshot().await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => error_response(e),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /session
/// Current session snapshot
pub async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    snapshot_response(&state).await
}

/// PUT /scenario
/// Replace the scenario before a session starts
pub async fn update_scenario(
    State(state): State<AppState>,
    Json(scenario): Json<ScenarioConfig>,
) -> impl IntoResponse {
    match state.session.set_scenario(scenario).await {
        Ok(scenario) => (StatusCode::OK, Json(scenario)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /scenario/feedback-areas
pub async fn add_feedback_area(
    State(state): State<AppState>,
    Json(req): Json<FeedbackAreaRequest>,
) -> impl IntoResponse {
    match state.session.add_feedback_area(req.area).await {
        Ok(scenario) => (StatusCode::OK, Json(scenario)).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /scenario/feedback-areas/:area
pub async fn remove_feedback_area(
    State(state): State<AppState>,
    Path(area): Path<String>,
) -> impl IntoResponse {
    match state.session.remove_feedback_area(area).await {
        Ok(scenario) => (StatusCode::OK, Json(scenario)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /session/start
/// Connect to the conversational agent with the current scenario
pub async fn start_session(State(state): State<AppState>) -> impl IntoResponse {
    info!("Starting practice session");

    match state.session.start_session().await {
        Ok(()) => snapshot_response(&state).await,
        Err(e) => {
            warn!("Refused to start session: {}", e);
            error_response(e)
        }
    }
}

/// POST /session/messages
/// Send a user message to the agent
pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> impl IntoResponse {
    match state.session.send_user_message(req.text).await {
        Ok(()) => snapshot_response(&state).await,
        Err(e) => error_response(e),
    }
}

/// POST /session/end
/// Disconnect and compute the session summary
pub async fn end_session(State(state): State<AppState>) -> impl IntoResponse {
    match state.session.end_session().await {
        Ok(summary) => (StatusCode::OK, Json(EndSessionResponse { summary })).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /session/evaluate
/// Score the finished conversation (falls back to a neutral result on backend failure)
pub async fn evaluate_session(State(state): State<AppState>) -> impl IntoResponse {
    match state.session.evaluate().await {
        Ok(evaluation) => (StatusCode::OK, Json(evaluation)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /session/new
pub async fn start_new_conversation(State(state): State<AppState>) -> impl IntoResponse {
    match state.session.start_new_conversation().await {
        Ok(()) => snapshot_response(&state).await,
        Err(e) => error_response(e),
    }
}

/// POST /session/retry
pub async fn retry_conversation(State(state): State<AppState>) -> impl IntoResponse {
    match state.session.retry_same_conversation().await {
        Ok(()) => snapshot_response(&state).await,
        Err(e) => error_response(e),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
