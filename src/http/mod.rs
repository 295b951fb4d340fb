//! HTTP API for the practice front end
//!
//! This module exposes the conversation lifecycle as a JSON REST API:
//! - GET /session - Current session snapshot
//! - PUT /scenario - Replace the scenario
//! - POST /scenario/feedback-areas - Add a feedback area
//! - DELETE /scenario/feedback-areas/:area - Remove a feedback area
//! - POST /session/start - Connect to the agent
//! - POST /session/messages - Send a user message
//! - POST /session/end - Disconnect and summarize
//! - POST /session/evaluate - Score the finished conversation
//! - POST /session/new - Start over with default settings
//! - POST /session/retry - Reconnect with the same scenario
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
