use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::controller::SessionController;
use super::state::{ConversationSession, SessionSummary};
use crate::error::SessionError;
use crate::evaluation::EvaluationResult;
use crate::scenario::ScenarioConfig;
use crate::transport::TransportEvent;

const COMMAND_CHANNEL_CAPACITY: usize = 32;

type Reply<T> = oneshot::Sender<T>;

enum Command {
    Snapshot(Reply<ConversationSession>),
    SetScenario(ScenarioConfig, Reply<Result<ScenarioConfig, SessionError>>),
    AddFeedbackArea(String, Reply<Result<ScenarioConfig, SessionError>>),
    RemoveFeedbackArea(String, Reply<Result<ScenarioConfig, SessionError>>),
    Start(Reply<Result<(), SessionError>>),
    Send(String, Reply<Result<(), SessionError>>),
    End(Reply<Option<SessionSummary>>),
    Evaluate(Reply<Result<EvaluationResult, SessionError>>),
    StartNew(Reply<Result<(), SessionError>>),
    Retry(Reply<Result<(), SessionError>>),
}

/// Handle to a session owned by a single dispatch task
///
/// Commands and transport events are applied one at a time, in arrival
/// order, so overlapping sends are serialized. Pending transport events
/// are always applied before the next command.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Spawn the dispatch loop for `session`
    pub fn spawn(
        controller: SessionController,
        session: ConversationSession,
        events: mpsc::Receiver<TransportEvent>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let task = tokio::spawn(run(controller, session, rx, events));
        (Self { commands: tx }, task)
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)
    }

    /// Owned copy of the current session
    pub async fn snapshot(&self) -> Result<ConversationSession, SessionError> {
        self.request(Command::Snapshot).await
    }

    pub async fn set_scenario(
        &self,
        scenario: ScenarioConfig,
    ) -> Result<ScenarioConfig, SessionError> {
        self.request(|reply| Command::SetScenario(scenario, reply)).await?
    }

    pub async fn add_feedback_area(&self, area: String) -> Result<ScenarioConfig, SessionError> {
        self.request(|reply| Command::AddFeedbackArea(area, reply)).await?
    }

    pub async fn remove_feedback_area(&self, area: String) -> Result<ScenarioConfig, SessionError> {
        self.request(|reply| Command::RemoveFeedbackArea(area, reply)).await?
    }

    pub async fn start_session(&self) -> Result<(), SessionError> {
        self.request(Command::Start).await?
    }

    pub async fn send_user_message(&self, text: String) -> Result<(), SessionError> {
        self.request(|reply| Command::Send(text, reply)).await?
    }

    pub async fn end_session(&self) -> Result<Option<SessionSummary>, SessionError> {
        self.request(Command::End).await
    }

    pub async fn evaluate(&self) -> Result<EvaluationResult, SessionError> {
        self.request(Command::Evaluate).await?
    }

    pub async fn start_new_conversation(&self) -> Result<(), SessionError> {
        self.request(Command::StartNew).await?
    }

    pub async fn retry_same_conversation(&self) -> Result<(), SessionError> {
        self.request(Command::Retry).await?
    }
}

async fn run(
    controller: SessionController,
    mut session: ConversationSession,
    mut commands: mpsc::Receiver<Command>,
    mut events: mpsc::Receiver<TransportEvent>,
) {
    info!("Session dispatch loop started");
    let mut events_open = true;

    loop {
        tokio::select! {
            biased;

            event = events.recv(), if events_open => match event {
                Some(event) => controller.handle_event(&mut session, event).await,
                None => {
                    debug!("Transport event channel closed");
                    events_open = false;
                }
            },

            command = commands.recv() => match command {
                Some(command) => dispatch(&controller, &mut session, command).await,
                None => break,
            },
        }
    }

    info!("Session dispatch loop stopped");
}

async fn dispatch(
    controller: &SessionController,
    session: &mut ConversationSession,
    command: Command,
) {
    // A dropped reply receiver only means the caller stopped waiting.
    match command {
        Command::Snapshot(reply) => {
            let _ = reply.send(session.clone());
        }
        Command::SetScenario(scenario, reply) => {
            let result = session
                .set_scenario(scenario)
                .map(|_| session.scenario().clone());
            let _ = reply.send(result);
        }
        Command::AddFeedbackArea(area, reply) => {
            let result = session
                .add_feedback_area(&area)
                .map(|_| session.scenario().clone());
            let _ = reply.send(result);
        }
        Command::RemoveFeedbackArea(area, reply) => {
            let result = session
                .remove_feedback_area(&area)
                .map(|_| session.scenario().clone());
            let _ = reply.send(result);
        }
        Command::Start(reply) => {
            let _ = reply.send(controller.start_session(session).await);
        }
        Command::Send(text, reply) => {
            let _ = reply.send(controller.send_user_message(session, &text).await);
        }
        Command::End(reply) => {
            let _ = reply.send(controller.end_session(session).await);
        }
        Command::Evaluate(reply) => {
            let _ = reply.send(controller.evaluate(session).await);
        }
        Command::StartNew(reply) => {
            let _ = reply.send(controller.start_new_conversation(session));
        }
        Command::Retry(reply) => {
            let _ = reply.send(controller.retry_same_conversation(session).await);
        }
    }
}
