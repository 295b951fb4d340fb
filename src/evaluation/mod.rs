//! Post-conversation evaluation
//!
//! Turns a finished transcript plus its scenario into one completion request
//! and parses the scored result.

mod client;
mod prompt;
mod result;

pub use client::{Evaluator, OpenAiEvaluator};
pub use prompt::{build_evaluation_prompt, COACH_SYSTEM_PROMPT};
pub use result::{parse_evaluation, EvaluationResult, MAX_SCORE, MIN_SCORE};
