use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::backend::{ConnectionType, InboundEvent};

/// Session start request published to NATS
#[derive(Debug, Serialize, Deserialize)]
pub struct StartSessionMessage {
    pub session_id: String,
    pub agent_id: String,
    pub connection_type: ConnectionType,
    pub user_id: String,
    pub timestamp: String, // RFC3339 timestamp
}

/// User text turn published to NATS
#[derive(Debug, Serialize, Deserialize)]
pub struct UserTextMessage {
    pub session_id: String,
    pub text: String,
    pub timestamp: String,
}

/// Session end notice published to NATS
#[derive(Debug, Serialize, Deserialize)]
pub struct EndSessionMessage {
    pub session_id: String,
    pub timestamp: String,
}

/// Agent-side event received from NATS
#[derive(Debug, Serialize, Deserialize)]
pub struct AgentEventMessage {
    pub session_id: String,
    #[serde(default)]
    pub message: Option<String>,
    /// "user" when the transport echoes a user turn, otherwise the agent
    #[serde(default)]
    pub source: String,
    /// Base64-encoded PCM bytes
    #[serde(default)]
    pub audio: Option<String>,
}

impl AgentEventMessage {
    /// Decode the loosely-shaped payload into an [`InboundEvent`]
    pub fn into_event(self) -> InboundEvent {
        let is_user = self.source == "user";

        match self.message {
            Some(text) if !text.is_empty() => InboundEvent::Text { text, is_user },
            _ => {
                if let Some(audio) = &self.audio {
                    match base64::engine::general_purpose::STANDARD.decode(audio) {
                        Ok(bytes) => tracing::debug!("Audio-only event ({} bytes)", bytes.len()),
                        Err(e) => warn!("Undecodable audio payload: {}", e),
                    }
                }
                InboundEvent::AudioOnly { is_user }
            }
        }
    }
}
