use anyhow::{Context, Result};
use async_nats::Client;
use futures::stream::{Stream, StreamExt};
use tokio::sync::{mpsc, Mutex, OnceCell};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::backend::{ConversationTransport, SessionStartConfig, TransportEvent};
use super::messages::{AgentEventMessage, EndSessionMessage, StartSessionMessage, UserTextMessage};

const START_SUBJECT: &str = "conversation.start";

struct ActiveSession {
    session_id: String,
    receive_task: JoinHandle<()>,
}

/// Conversational agent session bridged over NATS
///
/// The server connection is opened on the first session start, so an
/// unreachable server surfaces as a failed start rather than a failed boot.
///
/// Subjects:
/// - `conversation.start` - session start request
/// - `conversation.user.<id>` - user text turns
/// - `conversation.agent.<id>` - agent events (subscribed)
/// - `conversation.end.<id>` - session end notice
pub struct NatsTransport {
    url: String,
    client: OnceCell<Client>,
    events: mpsc::Sender<TransportEvent>,
    active: Mutex<Option<ActiveSession>>,
}

impl NatsTransport {
    pub fn new(url: impl Into<String>, events: mpsc::Sender<TransportEvent>) -> Self {
        Self {
            url: url.into(),
            client: OnceCell::new(),
            events,
            active: Mutex::new(None),
        }
    }

    /// Connected client, connecting on first use
    ///
    /// A failed attempt leaves the cell empty so the next start tries again.
    async fn client(&self) -> Result<&Client> {
        self.client
            .get_or_try_init(|| async {
                info!("Connecting to NATS at {}", self.url);

                let client = async_nats::connect(self.url.as_str())
                    .await
                    .with_context(|| format!("Failed to connect to NATS at {}", self.url))?;

                info!("Connected to NATS successfully");
                Ok::<_, anyhow::Error>(client)
            })
            .await
    }

    async fn publish<T: serde::Serialize>(&self, subject: String, message: &T) -> Result<()> {
        let payload = serde_json::to_vec(message)?;

        self.client()
            .await?
            .publish(subject.clone(), payload.into())
            .await
            .with_context(|| format!("Failed to publish to {}", subject))?;

        Ok(())
    }

    async fn active_session_id(&self) -> Result<String> {
        let active = self.active.lock().await;
        active
            .as_ref()
            .map(|s| s.session_id.clone())
            .context("No active conversation session")
    }
}

/// Queue `Connected`, then forward agent events for `session_id` until the stream ends
///
/// `Connected` goes first so a greeting already waiting on the subject is
/// applied after the session is live.
async fn announce_and_forward<S>(
    events: mpsc::Sender<TransportEvent>,
    session_id: String,
    payloads: S,
) -> Result<JoinHandle<()>>
where
    S: Stream + Send + 'static,
    S::Item: AsRef<[u8]> + Send,
{
    events
        .send(TransportEvent::Connected)
        .await
        .context("Session event channel closed")?;

    Ok(tokio::spawn(async move {
        info!("Agent event task started");
        tokio::pin!(payloads);

        while let Some(payload) = payloads.next().await {
            match serde_json::from_slice::<AgentEventMessage>(payload.as_ref()) {
                Ok(event) => {
                    if event.session_id != session_id {
                        continue;
                    }
                    if events
                        .send(TransportEvent::Message(event.into_event()))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to parse agent event: {}", e);
                }
            }
        }

        info!("Agent event task stopped");
        let _ = events.send(TransportEvent::Disconnected).await;
    }))
}

#[async_trait::async_trait]
impl ConversationTransport for NatsTransport {
    async fn start_session(&self, config: SessionStartConfig) -> Result<String> {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            warn!("Replacing active session {}", previous.session_id);
            previous.receive_task.abort();
        }

        let session_id = format!("conversation-{}", uuid::Uuid::new_v4());
        let subject = format!("conversation.agent.{}", session_id);

        let subscriber = self
            .client()
            .await?
            .subscribe(subject.clone())
            .await
            .context("Failed to subscribe to agent events")?;

        info!("Subscribed to {}", subject);

        self.publish(
            START_SUBJECT.to_string(),
            &StartSessionMessage {
                session_id: session_id.clone(),
                agent_id: config.agent_id,
                connection_type: config.connection_type,
                user_id: config.user_id,
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
        )
        .await?;

        let payloads = subscriber.map(|msg| msg.payload);
        let receive_task =
            announce_and_forward(self.events.clone(), session_id.clone(), payloads).await?;

        *active = Some(ActiveSession {
            session_id: session_id.clone(),
            receive_task,
        });

        Ok(session_id)
    }

    async fn end_session(&self) -> Result<()> {
        let session = self.active.lock().await.take();

        let Some(session) = session else {
            warn!("No active session to end");
            return Ok(());
        };

        info!("Ending session {}", session.session_id);
        session.receive_task.abort();

        let published = self
            .publish(
                format!("conversation.end.{}", session.session_id),
                &EndSessionMessage {
                    session_id: session.session_id.clone(),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                },
            )
            .await;

        if self.events.send(TransportEvent::Disconnected).await.is_err() {
            error!("Session event channel closed before disconnect");
        }

        published
    }

    async fn send_user_message(&self, text: &str) -> Result<()> {
        let session_id = self.active_session_id().await?;

        self.publish(
            format!("conversation.user.{}", session_id),
            &UserTextMessage {
                session_id,
                text: text.to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
        )
        .await
    }

    fn name(&self) -> &str {
        "nats"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::InboundEvent;

    #[tokio::test]
    async fn connected_is_queued_before_a_waiting_greeting() {
        let (tx, mut rx) = mpsc::channel(16);
        let payloads = futures::stream::iter(vec![
            br#"{ "session_id": "conversation-1", "message": "Why am I here?" }"#.to_vec(),
            br#"{ "session_id": "conversation-2", "message": "wrong session" }"#.to_vec(),
            b"not json".to_vec(),
        ]);

        let task = announce_and_forward(tx, "conversation-1".to_string(), payloads)
            .await
            .unwrap();
        task.await.unwrap();

        let mut received = Vec::new();
        while let Ok(event) = rx.try_recv() {
            received.push(event);
        }

        assert_eq!(
            received,
            vec![
                TransportEvent::Connected,
                TransportEvent::Message(InboundEvent::agent_text("Why am I here?")),
                TransportEvent::Disconnected,
            ]
        );
    }
}
