//! Transcript model
//!
//! An append-only, speaker-attributed log of one conversation:
//! - `Utterance`: one immutable timestamped turn
//! - `Transcript`: the ordered log plus the priming context and duration
//! - dialogue rendering into `You:` / `Agent:` lines and back

mod dialogue;
mod utterance;

pub use dialogue::{parse_dialogue, render_dialogue, AGENT_LABEL, USER_LABEL};
pub use utterance::{Speaker, Transcript, Utterance};
