//! Conversational agent transport boundary
//!
//! The session controller only sees this contract: start/end/send calls on
//! a [`ConversationTransport`] and [`TransportEvent`]s delivered on a channel.
//! Raw wire payloads are decoded into [`InboundEvent`] here and never passed on.

pub mod backend;
pub mod messages;
pub mod nats;

pub use backend::{
    event_channel, ConnectionType, ConversationTransport, InboundEvent, SessionStartConfig,
    TransportEvent, EVENT_CHANNEL_CAPACITY,
};
pub use messages::{AgentEventMessage, EndSessionMessage, StartSessionMessage, UserTextMessage};
pub use nats::NatsTransport;
