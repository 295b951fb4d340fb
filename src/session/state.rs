use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SessionError;
use crate::evaluation::EvaluationResult;
use crate::scenario::ScenarioConfig;
use crate::transcript::Transcript;

/// Lifecycle phase of a practice conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Setup,
    Connecting,
    Connected,
    Summary,
}

impl Phase {
    /// Connecting or connected; the scenario is frozen
    pub fn is_live(self) -> bool {
        matches!(self, Phase::Connecting | Phase::Connected)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Setup => "in setup",
            Phase::Connecting => "connecting",
            Phase::Connected => "connected",
            Phase::Summary => "showing the summary",
        };
        f.write_str(name)
    }
}

/// Statistics about a finished conversation, computed once at disconnect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Elapsed time, e.g. "2m 5s"
    pub duration: String,

    pub message_count: usize,

    pub user_messages: usize,

    pub agent_messages: usize,
}

impl SessionSummary {
    pub fn from_transcript(transcript: &Transcript, elapsed: chrono::Duration) -> Self {
        Self {
            duration: format_duration(elapsed),
            message_count: transcript.message_count(),
            user_messages: transcript.user_messages(),
            agent_messages: transcript.agent_messages(),
        }
    }
}

/// Format as whole minutes and seconds; negative spans clamp to zero
pub fn format_duration(elapsed: chrono::Duration) -> String {
    let millis = elapsed.num_milliseconds().max(0);
    let minutes = millis / 60_000;
    let seconds = (millis % 60_000) / 1000;
    format!("{}m {}s", minutes, seconds)
}

/// One practice conversation, from setup through evaluation
///
/// This is plain data: the [`SessionController`](super::SessionController)
/// takes it by mutable reference for every transition, so any number of
/// independent sessions can exist side by side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationSession {
    pub(super) phase: Phase,
    pub(super) scenario: ScenarioConfig,
    pub(super) transcript: Transcript,
    pub(super) summary: Option<SessionSummary>,
    pub(super) evaluation: Option<EvaluationResult>,
    pub(super) started_at: Option<DateTime<Utc>>,
    pub(super) send_in_flight: bool,
    pub(super) conversation_id: Option<String>,
}

impl ConversationSession {
    /// Fresh session with the default scenario
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scenario(scenario: ScenarioConfig) -> Self {
        Self {
            scenario,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn scenario(&self) -> &ScenarioConfig {
        &self.scenario
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn evaluation(&self) -> Option<&EvaluationResult> {
        self.evaluation.as_ref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn is_send_in_flight(&self) -> bool {
        self.send_in_flight
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Replace the scenario; refused while a session is live
    pub fn set_scenario(&mut self, scenario: ScenarioConfig) -> Result<(), SessionError> {
        self.ensure_editable()?;
        self.scenario = scenario.normalized();
        Ok(())
    }

    pub fn add_feedback_area(&mut self, area: &str) -> Result<(), SessionError> {
        self.ensure_editable()?;
        if self.scenario.add_feedback_area(area) {
            Ok(())
        } else {
            Err(SessionError::InvalidFeedbackArea)
        }
    }

    /// Remove a feedback area; removing an absent one is a no-op
    pub fn remove_feedback_area(&mut self, area: &str) -> Result<(), SessionError> {
        self.ensure_editable()?;
        self.scenario.remove_feedback_area(area);
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), SessionError> {
        if self.phase.is_live() {
            Err(SessionError::ScenarioFrozen)
        } else {
            Ok(())
        }
    }

    /// Check the send guards and mark a send as in flight
    pub(super) fn begin_send(&mut self, text: &str) -> Result<(), SessionError> {
        if self.phase != Phase::Connected {
            return Err(SessionError::NotConnected);
        }
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        if self.send_in_flight {
            return Err(SessionError::SendInFlight);
        }
        self.send_in_flight = true;
        Ok(())
    }

    pub(super) fn finish_send(&mut self) {
        self.send_in_flight = false;
    }

    /// Drop transcript, summary and evaluation, keeping the scenario
    pub(super) fn reset_conversation(&mut self) {
        self.transcript = Transcript::new();
        self.summary = None;
        self.evaluation = None;
        self.started_at = None;
        self.send_in_flight = false;
        self.conversation_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected() -> ConversationSession {
        ConversationSession {
            phase: Phase::Connected,
            ..ConversationSession::default()
        }
    }

    #[test]
    fn overlapping_send_is_rejected_until_settled() {
        let mut session = connected();

        session.begin_send("first").unwrap();
        assert_eq!(session.begin_send("second"), Err(SessionError::SendInFlight));

        session.finish_send();
        assert!(session.begin_send("second").is_ok());
    }

    #[test]
    fn send_guards() {
        let mut session = connected();
        assert_eq!(session.begin_send("  \n"), Err(SessionError::EmptyMessage));

        let mut idle = ConversationSession::new();
        assert_eq!(idle.begin_send("hello"), Err(SessionError::NotConnected));
        assert!(!idle.is_send_in_flight());
    }

    #[test]
    fn scenario_is_frozen_while_live() {
        let mut session = connected();
        assert_eq!(
            session.add_feedback_area("Tone"),
            Err(SessionError::ScenarioFrozen)
        );
        assert_eq!(
            session.set_scenario(ScenarioConfig::default()),
            Err(SessionError::ScenarioFrozen)
        );
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(chrono::Duration::milliseconds(90_500)), "1m 30s");
        assert_eq!(format_duration(chrono::Duration::seconds(5)), "0m 5s");
        assert_eq!(format_duration(chrono::Duration::seconds(-3)), "0m 0s");
    }
}
