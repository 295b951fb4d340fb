use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Scenario setup
        .route("/scenario", put(handlers::update_scenario))
        .route(
            "/scenario/feedback-areas",
            post(handlers::add_feedback_area),
        )
        .route(
            "/scenario/feedback-areas/:area",
            delete(handlers::remove_feedback_area),
        )
        // Conversation lifecycle
        .route("/session", get(handlers::get_session))
        .route("/session/start", post(handlers::start_session))
        .route("/session/messages", post(handlers::send_message))
        .route("/session/end", post(handlers::end_session))
        .route("/session/evaluate", post(handlers::evaluate_session))
        .route("/session/new", post(handlers::start_new_conversation))
        .route("/session/retry", post(handlers::retry_conversation))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
