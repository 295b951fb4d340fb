// Shared fixtures for session tests: a scripted in-memory transport and a
// canned evaluator.

#![allow(dead_code)]

use anyhow::{bail, Result};
use conversation_coach::config::AgentConfig;
use conversation_coach::error::EvaluationError;
use conversation_coach::evaluation::{EvaluationResult, Evaluator};
use conversation_coach::session::{ConversationSession, SessionController};
use conversation_coach::transcript::Transcript;
use conversation_coach::transport::{
    event_channel, ConnectionType, ConversationTransport, InboundEvent, SessionStartConfig,
    TransportEvent,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Transport that records calls and reports events on a channel
pub struct ScriptedTransport {
    events: mpsc::Sender<TransportEvent>,
    pub fail_start: AtomicBool,
    pub fail_send: AtomicBool,
    pub sent: Mutex<Vec<String>>,
    pub start_configs: Mutex<Vec<SessionStartConfig>>,
    pub end_calls: AtomicUsize,
    sessions: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(events: mpsc::Sender<TransportEvent>) -> Self {
        Self {
            events,
            fail_start: AtomicBool::new(false),
            fail_send: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
            start_configs: Mutex::new(Vec::new()),
            end_calls: AtomicUsize::new(0),
            sessions: AtomicUsize::new(0),
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// Deliver an inbound message as the agent platform would
    pub async fn deliver(&self, event: InboundEvent) {
        self.events
            .send(TransportEvent::Message(event))
            .await
            .unwrap();
    }

    pub async fn drop_connection(&self) {
        self.events.send(TransportEvent::Disconnected).await.unwrap();
    }
}

#[async_trait::async_trait]
impl ConversationTransport for ScriptedTransport {
    async fn start_session(&self, config: SessionStartConfig) -> Result<String> {
        self.start_configs.lock().unwrap().push(config);
        if self.fail_start.load(Ordering::SeqCst) {
            bail!("agent not found");
        }
        let n = self.sessions.fetch_add(1, Ordering::SeqCst);
        self.events.send(TransportEvent::Connected).await?;
        Ok(format!("conv-{}", n))
    }

    async fn end_session(&self) -> Result<()> {
        self.end_calls.fetch_add(1, Ordering::SeqCst);
        self.events.send(TransportEvent::Disconnected).await?;
        Ok(())
    }

    async fn send_user_message(&self, text: &str) -> Result<()> {
        if self.fail_send.load(Ordering::SeqCst) {
            bail!("socket closed");
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Evaluator returning a canned outcome and recording what it was given
pub struct StubEvaluator {
    pub outcome: Mutex<Option<EvaluationResult>>,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<(Transcript, String, Vec<String>)>>,
}

impl StubEvaluator {
    pub fn returning(result: EvaluationResult) -> Self {
        Self {
            outcome: Mutex::new(Some(result)),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails as if the backend sent garbage
    pub fn failing() -> Self {
        Self {
            outcome: Mutex::new(None),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Evaluator for StubEvaluator {
    async fn evaluate(
        &self,
        transcript: &Transcript,
        scenario_description: &str,
        feedback_areas: &[String],
    ) -> Result<EvaluationResult, EvaluationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push((
            transcript.clone(),
            scenario_description.to_string(),
            feedback_areas.to_vec(),
        ));
        self.outcome
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| EvaluationError::Parse("expected value at line 1 column 1".to_string()))
    }
}

pub fn sample_evaluation() -> EvaluationResult {
    EvaluationResult {
        score: 9,
        feedback: "Clear and empathetic.".to_string(),
        strengths: vec!["Set context early".to_string(), "Stayed calm".to_string()],
        improvements: vec!["Ask more open questions".to_string()],
    }
}

pub fn agent_config() -> AgentConfig {
    AgentConfig {
        agent_id: "agent-123".to_string(),
        user_id: Some("tester".to_string()),
        connection_type: ConnectionType::Websocket,
        nats_url: "nats://localhost:4222".to_string(),
    }
}

pub struct Harness {
    pub controller: SessionController,
    pub transport: Arc<ScriptedTransport>,
    pub evaluator: Arc<StubEvaluator>,
    pub events: mpsc::Receiver<TransportEvent>,
}

impl Harness {
    pub fn new(evaluator: StubEvaluator) -> Self {
        let (tx, rx) = event_channel();
        let transport = Arc::new(ScriptedTransport::new(tx));
        let evaluator = Arc::new(evaluator);
        let controller = SessionController::new(
            transport.clone(),
            evaluator.clone(),
            agent_config(),
        );
        Self {
            controller,
            transport,
            evaluator,
            events: rx,
        }
    }

    /// Apply every event the transport has queued so far
    pub async fn pump(&mut self, session: &mut ConversationSession) {
        while let Ok(event) = self.events.try_recv() {
            self.controller.handle_event(session, event).await;
        }
    }
}
