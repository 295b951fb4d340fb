//! Practice conversation lifecycle
//!
//! This module provides:
//! - `ConversationSession`: the explicit state of one conversation
//! - `SessionController`: the transition table (setup, connect, send, end, evaluate)
//! - `SessionHandle`: a single dispatch task applying commands and transport events in order
//! - `SessionSummary`: statistics computed once when a conversation ends

mod controller;
mod handle;
mod state;

pub use controller::{
    priming_message, SessionController, AUDIO_PLACEHOLDER_TEXT, CONNECT_ERROR_TEXT,
    PRIMING_INSTRUCTIONS, SEND_ERROR_TEXT,
};
pub use handle::SessionHandle;
pub use state::{format_duration, ConversationSession, Phase, SessionSummary};
