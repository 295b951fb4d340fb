use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::state::{ConversationSession, Phase, SessionSummary};
use crate::config::AgentConfig;
use crate::error::{EvaluationError, SessionError};
use crate::evaluation::{EvaluationResult, Evaluator};
use crate::scenario::ScenarioConfig;
use crate::transcript::{Speaker, Utterance};
use crate::transport::{ConversationTransport, InboundEvent, TransportEvent};

/// Appended to the persona prompt so the agent only speaks dialogue
pub const PRIMING_INSTRUCTIONS: &str = "\
You must respond with ONLY spoken dialogue. Never include:
- Stage directions (e.g., *laughs*, *sighs*)
- Actions in parentheses (e.g., (stares at hands))
- Descriptions of tone or manner (e.g., \"mumbles\", \"says quietly\")
- Any non-verbal content

Only output the exact words you would speak aloud.";

pub const CONNECT_ERROR_TEXT: &str =
    "Failed to start conversation. Please check your Agent ID and try again.";
pub const SEND_ERROR_TEXT: &str = "Sorry, there was an error sending your message.";
pub const AUDIO_PLACEHOLDER_TEXT: &str = "Received audio response";

const DEFAULT_CONTEXT: &str = "General conversation practice";
const UNKNOWN_DURATION: &str = "Unknown";

/// Build the priming message sent right after connecting
pub fn priming_message(agent_prompt: &str) -> String {
    format!("{}\n\n{}", agent_prompt, PRIMING_INSTRUCTIONS)
}

/// Drives a [`ConversationSession`] through its lifecycle
///
/// Transport failures are turned into agent-authored transcript entries and
/// evaluation failures into [`EvaluationResult::fallback`]; only guard
/// violations come back as [`SessionError`], with the session left untouched.
pub struct SessionController {
    transport: Arc<dyn ConversationTransport>,
    evaluator: Arc<dyn Evaluator>,
    agent: AgentConfig,
}

impl SessionController {
    pub fn new(
        transport: Arc<dyn ConversationTransport>,
        evaluator: Arc<dyn Evaluator>,
        agent: AgentConfig,
    ) -> Self {
        Self {
            transport,
            evaluator,
            agent,
        }
    }

    /// Idle/Setup -> Connecting (or back to Setup if the transport refuses)
    pub async fn start_session(
        &self,
        session: &mut ConversationSession,
    ) -> Result<(), SessionError> {
        if !matches!(session.phase, Phase::Idle | Phase::Setup) {
            return Err(SessionError::InvalidTransition {
                action: "start a session",
                phase: session.phase,
            });
        }
        if !session.scenario.is_complete() {
            return Err(SessionError::IncompleteScenario);
        }

        session.reset_conversation();
        session.phase = Phase::Connecting;

        let start_config = self.agent.start_config();
        info!(
            "Starting conversation with agent {} via {}",
            start_config.agent_id,
            self.transport.name()
        );

        match self.transport.start_session(start_config).await {
            Ok(conversation_id) => {
                info!("Conversation started with ID: {}", conversation_id);
                session.conversation_id = Some(conversation_id);
            }
            Err(e) => {
                error!("Failed to start conversation: {:#}", e);
                session.transcript.append(Utterance::agent(CONNECT_ERROR_TEXT));
                session.phase = Phase::Setup;
            }
        }

        Ok(())
    }

    /// Apply one transport event
    pub async fn handle_event(&self, session: &mut ConversationSession, event: TransportEvent) {
        match event {
            TransportEvent::Connected => self.on_connect(session).await,
            TransportEvent::Disconnected => self.on_disconnect(session),
            TransportEvent::Message(message) => Self::on_message(session, message),
        }
    }

    async fn on_connect(&self, session: &mut ConversationSession) {
        if session.phase != Phase::Connecting {
            warn!("Ignoring connect while {}", session.phase);
            return;
        }

        info!("Connected to conversational agent");
        session.phase = Phase::Connected;
        session.started_at = Some(Utc::now());
        session.summary = None;
        session.evaluation = None;

        let prompt = session.scenario.agent_prompt.clone();
        session.transcript.context = prompt.clone();

        if let Err(e) = self
            .transport
            .send_user_message(&priming_message(&prompt))
            .await
        {
            error!("Error sending prompt to agent: {:#}", e);
        }
    }

    fn on_disconnect(&self, session: &mut ConversationSession) {
        info!("Disconnected from conversational agent");
        session.conversation_id = None;

        match session.phase {
            Phase::Connected => {
                Self::summarize(session);
            }
            Phase::Connecting => session.phase = Phase::Setup,
            _ => {}
        }
    }

    fn on_message(session: &mut ConversationSession, message: InboundEvent) {
        if session.phase != Phase::Connected {
            debug!("Dropping message received while {}", session.phase);
            return;
        }

        let speaker = if message.is_user() {
            Speaker::User
        } else {
            Speaker::Agent
        };
        let text = match message {
            InboundEvent::Text { text, .. } => text,
            InboundEvent::AudioOnly { .. } => AUDIO_PLACEHOLDER_TEXT.to_string(),
        };

        debug!("Received {:?} message", speaker);
        session.transcript.append(Utterance::new(speaker, text));
    }

    /// Send a user turn; appended before the transport call settles
    pub async fn send_user_message(
        &self,
        session: &mut ConversationSession,
        text: &str,
    ) -> Result<(), SessionError> {
        session.begin_send(text)?;
        session.transcript.append(Utterance::user(text));

        let result = self.transport.send_user_message(text).await;
        session.finish_send();

        if let Err(e) = result {
            error!("Error sending message: {:#}", e);
            session.transcript.append(Utterance::agent(SEND_ERROR_TEXT));
        }

        Ok(())
    }

    /// Connected -> Summary, returning the summary
    ///
    /// A no-op returning `None` when no session was started in this cycle.
    pub async fn end_session(&self, session: &mut ConversationSession) -> Option<SessionSummary> {
        match session.phase {
            Phase::Connected => {
                if let Err(e) = self.transport.end_session().await {
                    error!("Error ending session: {:#}", e);
                }
                session.conversation_id = None;
                Self::summarize(session)
            }
            Phase::Connecting => {
                if let Err(e) = self.transport.end_session().await {
                    error!("Error ending session: {:#}", e);
                }
                session.conversation_id = None;
                session.phase = Phase::Setup;
                None
            }
            _ => {
                debug!("End requested while {}; nothing to do", session.phase);
                None
            }
        }
    }

    fn summarize(session: &mut ConversationSession) -> Option<SessionSummary> {
        session.phase = Phase::Summary;
        let started_at = session.started_at.take()?;

        let summary =
            SessionSummary::from_transcript(&session.transcript, Utc::now() - started_at);
        session.transcript.duration = summary.duration.clone();

        info!(
            "Conversation finished: {} messages ({} user, {} agent) in {}",
            summary.message_count, summary.user_messages, summary.agent_messages, summary.duration
        );

        session.summary = Some(summary.clone());
        Some(summary)
    }

    /// Score the finished conversation, substituting the fallback result on any backend failure
    ///
    /// Only a summarized conversation is scored; a transcript left in Setup by a
    /// failed connect holds nothing but the synthetic error turn.
    pub async fn evaluate(
        &self,
        session: &mut ConversationSession,
    ) -> Result<EvaluationResult, SessionError> {
        if session.phase != Phase::Summary {
            return Err(SessionError::InvalidTransition {
                action: "evaluate",
                phase: session.phase,
            });
        }
        if session.transcript.is_empty() {
            return Err(SessionError::EmptyTranscript);
        }

        let mut snapshot = session.transcript.clone();
        if snapshot.context.trim().is_empty() {
            snapshot.context = if session.scenario.agent_prompt.trim().is_empty() {
                DEFAULT_CONTEXT.to_string()
            } else {
                session.scenario.agent_prompt.clone()
            };
        }
        snapshot.duration = session
            .summary
            .as_ref()
            .map(|s| s.duration.clone())
            .unwrap_or_else(|| UNKNOWN_DURATION.to_string());

        let result = match self
            .evaluator
            .evaluate(
                &snapshot,
                &session.scenario.scenario_description,
                session.scenario.feedback_areas(),
            )
            .await
        {
            Ok(result) => {
                info!("Evaluation complete: score {}/10", result.score);
                result
            }
            Err(EvaluationError::MissingCredential) => {
                error!("Evaluation API key is not configured; using fallback evaluation");
                EvaluationResult::fallback()
            }
            Err(e) => {
                error!("Error evaluating conversation: {}", e);
                EvaluationResult::fallback()
            }
        };

        session.evaluation = Some(result.clone());
        Ok(result)
    }

    /// Summary -> Setup with a fresh default scenario
    pub fn start_new_conversation(
        &self,
        session: &mut ConversationSession,
    ) -> Result<(), SessionError> {
        if session.phase.is_live() {
            return Err(SessionError::InvalidTransition {
                action: "start a new conversation",
                phase: session.phase,
            });
        }

        *session = ConversationSession::with_scenario(ScenarioConfig::default());
        session.phase = Phase::Setup;
        Ok(())
    }

    /// Summary -> Connecting, keeping the current scenario
    pub async fn retry_same_conversation(
        &self,
        session: &mut ConversationSession,
    ) -> Result<(), SessionError> {
        if session.phase != Phase::Summary {
            return Err(SessionError::InvalidTransition {
                action: "retry the conversation",
                phase: session.phase,
            });
        }
        if !session.scenario.is_complete() {
            return Err(SessionError::IncompleteScenario);
        }

        session.reset_conversation();
        session.phase = Phase::Setup;
        self.start_session(session).await
    }
}
