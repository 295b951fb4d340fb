use crate::transcript::{render_dialogue, Transcript};

/// System instruction for the coaching persona
pub const COACH_SYSTEM_PROMPT: &str = "You are an expert communication coach. Analyze conversation transcripts and provide detailed feedback on communication skills.";

/// Build the user prompt for one evaluation request
///
/// Embeds the scenario, the focus areas (when any) and the full dialogue,
/// and asks for a JSON object with `score`, `feedback`, `strengths` and `improvements`.
pub fn build_evaluation_prompt(
    transcript: &Transcript,
    scenario_description: &str,
    feedback_areas: &[String],
) -> String {
    let mut prompt = String::from(
        "You are an expert communication and leadership coach. Please evaluate this conversation \
         transcript and provide detailed feedback for the leader. You are given a scenario description \
         of the conversation and a transcript of the conversation - evaluate how well the leader is \
         performing relative to the stated goal of the conversation.\n\n",
    );

    prompt.push_str("SCENARIO DESCRIPTION:\n");
    prompt.push_str(scenario_description.trim());
    prompt.push_str("\n\n");

    if !feedback_areas.is_empty() {
        prompt.push_str("FOCUS AREAS:\n");
        for area in feedback_areas {
            prompt.push_str("- ");
            prompt.push_str(area);
            prompt.push('\n');
        }
        prompt.push('\n');
    }

    prompt.push_str("TRANSCRIPT:\n");
    prompt.push_str(&render_dialogue(transcript));
    prompt.push_str("\n\n");

    prompt.push_str(
        "Please provide:\n\
         1. Overall score (1-10)\n\
         2. Detailed feedback on communication skills\n\
         3. 3-5 specific strengths demonstrated\n\
         4. 3-5 areas for improvement\n\
         5. Specific suggestions for better conversation management\n\n\
         Format your response as JSON:\n\
         {\n  \"score\": number,\n  \"feedback\": \"detailed feedback text\",\n  \
         \"strengths\": [\"strength1\", \"strength2\", \"strength3\"],\n  \
         \"improvements\": [\"improvement1\", \"improvement2\", \"improvement3\"]\n}\n",
    );

    prompt
}
