use anyhow::{Context, Result};
use serde::Deserialize;

use crate::transport::{ConnectionType, SessionStartConfig};

/// Environment variable selecting the conversational agent identity
pub const AGENT_ID_ENV: &str = "COACH_AGENT_ID";

/// Environment variable carrying the evaluation backend credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Agent identity used when none is configured
pub const PLACEHOLDER_AGENT_ID: &str = "your-agent-id-here";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub agent: AgentConfig,
    pub evaluation: EvaluationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub agent_id: String,
    pub user_id: Option<String>,
    pub connection_type: ConnectionType,
    pub nats_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationConfig {
    /// Never logged
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
}

impl Config {
    /// Load configuration from defaults, an optional file at `path`, and the environment.
    ///
    /// `COACH__SECTION__KEY` overrides any file value. The two well-known
    /// variables `COACH_AGENT_ID` and `OPENAI_API_KEY` are applied last.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "conversation-coach")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8787_i64)?
            .set_default("agent.agent_id", PLACEHOLDER_AGENT_ID)?
            .set_default("agent.connection_type", "websocket")?
            .set_default("agent.nats_url", "nats://localhost:4222")?
            .set_default("evaluation.api_base", "https://api.openai.com/v1")?
            .set_default("evaluation.model", "gpt-4")?
            .set_default("evaluation.temperature", 0.3)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("COACH")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("agent.agent_id", non_empty_env(AGENT_ID_ENV))?
            .set_override_option("evaluation.api_key", non_empty_env(API_KEY_ENV))?
            .build()
            .with_context(|| format!("Failed to load configuration from {}", path))?;

        Ok(settings.try_deserialize()?)
    }
}

impl AgentConfig {
    /// Build the transport start configuration, filling in a generated user id when unset
    pub fn start_config(&self) -> SessionStartConfig {
        let agent_id = if self.agent_id.trim().is_empty() {
            PLACEHOLDER_AGENT_ID.to_string()
        } else {
            self.agent_id.clone()
        };

        let user_id = self
            .user_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("user-{}", chrono::Utc::now().timestamp_millis()));

        SessionStartConfig {
            agent_id,
            connection_type: self.connection_type,
            user_id,
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
