use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Agent,
}

/// A single turn in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    #[serde(default = "new_id")]
    id: String,
    text: String,
    speaker: Speaker,
    timestamp: DateTime<Utc>,
}

impl Utterance {
    /// Create an utterance stamped with the current time
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self::at(speaker, text, Utc::now())
    }

    pub fn at(speaker: Speaker, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            speaker,
            timestamp,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, text)
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(Speaker::Agent, text)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_user(&self) -> bool {
        self.speaker == Speaker::User
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Ordered utterance log for one conversation
///
/// Utterances keep insertion order, which is the order the transport
/// delivered them; nothing is ever re-sorted or removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(rename = "messages")]
    utterances: Vec<Utterance>,

    /// Prompt used to prime the agent
    #[serde(default)]
    pub context: String,

    /// Elapsed wall-clock time, e.g. "1m 30s"
    #[serde(default)]
    pub duration: String,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            ..Self::default()
        }
    }

    pub fn append(&mut self, utterance: Utterance) {
        self.utterances.push(utterance);
    }

    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    pub fn message_count(&self) -> usize {
        self.utterances.len()
    }

    pub fn count_by(&self, speaker: Speaker) -> usize {
        self.utterances
            .iter()
            .filter(|u| u.speaker == speaker)
            .count()
    }

    pub fn user_messages(&self) -> usize {
        self.count_by(Speaker::User)
    }

    pub fn agent_messages(&self) -> usize {
        self.count_by(Speaker::Agent)
    }
}
