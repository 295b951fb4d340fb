use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::prompt::{build_evaluation_prompt, COACH_SYSTEM_PROMPT};
use super::result::{parse_evaluation, EvaluationResult};
use crate::config::EvaluationConfig;
use crate::error::EvaluationError;
use crate::transcript::Transcript;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Scores a finished conversation
#[async_trait::async_trait]
pub trait Evaluator: Send + Sync {
    /// Evaluate `transcript` against the scenario it was practising
    ///
    /// Performs at most one backend request and never retries.
    async fn evaluate(
        &self,
        transcript: &Transcript,
        scenario_description: &str,
        feedback_areas: &[String],
    ) -> Result<EvaluationResult, EvaluationError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Evaluator backed by an OpenAI-compatible chat completions endpoint
pub struct OpenAiEvaluator {
    client: reqwest::Client,
    api_key: Option<String>,
    api_base: String,
    model: String,
    temperature: f32,
}

impl OpenAiEvaluator {
    pub fn new(
        api_key: Option<String>,
        api_base: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature,
        }
    }

    pub fn from_config(config: &EvaluationConfig) -> Self {
        Self::new(
            config.api_key.clone(),
            config.api_base.clone(),
            config.model.clone(),
            config.temperature,
        )
    }
}

#[async_trait::async_trait]
impl Evaluator for OpenAiEvaluator {
    async fn evaluate(
        &self,
        transcript: &Transcript,
        scenario_description: &str,
        feedback_areas: &[String],
    ) -> Result<EvaluationResult, EvaluationError> {
        if transcript.is_empty() {
            return Err(EvaluationError::EmptyTranscript);
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(EvaluationError::MissingCredential)?;

        let prompt = build_evaluation_prompt(transcript, scenario_description, feedback_areas);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: COACH_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: self.temperature,
        };

        info!(
            "Requesting evaluation from {} ({} utterances)",
            self.model,
            transcript.message_count()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EvaluationError::Backend { status, body });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| EvaluationError::Parse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| EvaluationError::Parse("completion has no content".to_string()))?;

        debug!("Evaluation response: {}", content);

        parse_evaluation(&content)
    }
}
