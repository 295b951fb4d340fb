use serde::{Deserialize, Serialize};

use crate::error::EvaluationError;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

/// Scored coaching feedback for one conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Overall score, 1..=10
    pub score: u8,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

impl EvaluationResult {
    /// Neutral result shown when the backend could not produce one
    pub fn fallback() -> Self {
        Self {
            score: 7,
            feedback: "Unable to generate evaluation at this time. Please try again later."
                .to_string(),
            strengths: vec!["Conversation completed successfully".to_string()],
            improvements: vec!["Evaluation service unavailable".to_string()],
        }
    }
}

#[derive(Deserialize)]
struct RawEvaluation {
    score: serde_json::Number,
    feedback: String,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
}

/// Parse a completion body into an [`EvaluationResult`]
///
/// Accepts bare JSON or JSON inside a Markdown code fence. Integral floats
/// such as `8.0` are accepted; anything outside 1..=10 is rejected.
pub fn parse_evaluation(content: &str) -> Result<EvaluationResult, EvaluationError> {
    let raw: RawEvaluation = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| EvaluationError::Parse(e.to_string()))?;

    let score = match raw.score.as_i64() {
        Some(n) => n,
        None => match raw.score.as_f64() {
            Some(f) if f.fract() == 0.0 => f as i64,
            _ => return Err(EvaluationError::Parse(format!("non-integer score {}", raw.score))),
        },
    };

    if !(MIN_SCORE as i64..=MAX_SCORE as i64).contains(&score) {
        return Err(EvaluationError::InvalidScore(score));
    }

    Ok(EvaluationResult {
        score: score as u8,
        feedback: raw.feedback,
        strengths: raw.strengths,
        improvements: raw.improvements,
    })
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the language tag line, e.g. ```json
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
