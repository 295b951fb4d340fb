//! Error types for the coaching core
//!
//! Transport failures never show up here: the session controller turns them
//! into in-band transcript entries instead of errors.

use thiserror::Error;

use crate::session::Phase;

/// Errors produced by an evaluation request
#[derive(Error, Debug)]
pub enum EvaluationError {
    /// No API credential configured; raised before any network call
    #[error("Evaluation API key is not set")]
    MissingCredential,

    /// Nothing to evaluate; raised before any network call
    #[error("Cannot evaluate an empty transcript")]
    EmptyTranscript,

    #[error("Evaluation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Evaluation backend returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Failed to parse evaluation response: {0}")]
    Parse(String),

    #[error("Evaluation score {0} is outside 1..=10")]
    InvalidScore(i64),
}

/// Guard violations surfaced to the caller of a session operation
///
/// A session operation that returns one of these leaves the session unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Scenario description and agent prompt are both required")]
    IncompleteScenario,

    #[error("Cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },

    #[error("Message text is empty")]
    EmptyMessage,

    #[error("Not connected to the conversational agent")]
    NotConnected,

    #[error("A message is already being sent")]
    SendInFlight,

    #[error("Transcript is empty; nothing to evaluate")]
    EmptyTranscript,

    #[error("Scenario cannot be edited while a session is live")]
    ScenarioFrozen,

    #[error("Feedback area is empty or already present")]
    InvalidFeedbackArea,

    #[error("Session runtime has shut down")]
    Closed,
}
