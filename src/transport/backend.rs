use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Buffered events between the transport and the dispatch loop
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// How the agent session is carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    #[default]
    Websocket,
    Webrtc,
}

/// Identity handed to the transport when a session starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStartConfig {
    /// Conversational agent to talk to
    pub agent_id: String,

    pub connection_type: ConnectionType,

    pub user_id: String,
}

/// Message from the agent session, decoded at the boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Text turn; `is_user` is set when the transport attributes it to the user
    Text { text: String, is_user: bool },

    /// Audio-only turn with no transcribed text
    AudioOnly { is_user: bool },
}

impl InboundEvent {
    pub fn agent_text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            is_user: false,
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            is_user: true,
        }
    }

    pub fn is_user(&self) -> bool {
        match self {
            Self::Text { is_user, .. } | Self::AudioOnly { is_user } => *is_user,
        }
    }
}

/// Callback-style notifications from the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    Message(InboundEvent),
}

/// Create the channel a transport pushes its events into
pub fn event_channel() -> (mpsc::Sender<TransportEvent>, mpsc::Receiver<TransportEvent>) {
    mpsc::channel(EVENT_CHANNEL_CAPACITY)
}

/// Bidirectional session with a conversational agent
///
/// Implementations report `Connected`, `Disconnected` and inbound messages
/// through the event sender they were constructed with, in delivery order.
#[async_trait::async_trait]
pub trait ConversationTransport: Send + Sync {
    /// Open a session and return its conversation id
    ///
    /// `Connected` is delivered as an event once the session is usable.
    async fn start_session(&self, config: SessionStartConfig) -> Result<String>;

    /// Close the active session
    async fn end_session(&self) -> Result<()>;

    /// Send a text turn on behalf of the user
    async fn send_user_message(&self, text: &str) -> Result<()>;

    /// Transport name for logging
    fn name(&self) -> &str;
}
