use super::utterance::{Speaker, Transcript};

pub const USER_LABEL: &str = "You";
pub const AGENT_LABEL: &str = "Agent";

/// Prefix marking the second and later lines of a multi-line turn
const CONTINUATION_INDENT: &str = "  ";

fn label(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::User => USER_LABEL,
        Speaker::Agent => AGENT_LABEL,
    }
}

/// Render the transcript as `You: ...` / `Agent: ...` lines in original order
///
/// Continuation lines are indented so text that happens to start with a
/// label never reads as a new turn.
pub fn render_dialogue(transcript: &Transcript) -> String {
    transcript
        .utterances()
        .iter()
        .map(|u| {
            let text = u
                .text()
                .replace('\n', &format!("\n{}", CONTINUATION_INDENT));
            format!("{}: {}", label(u.speaker()), text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Recover `(speaker, text)` turns from rendered dialogue
///
/// An indented line continues the previous turn; otherwise a line starting
/// with a speaker label opens a new turn. Unlabelled, unindented lines also
/// continue the previous turn. Lines before the first label are ignored.
pub fn parse_dialogue(rendered: &str) -> Vec<(Speaker, String)> {
    let user_prefix = format!("{}: ", USER_LABEL);
    let agent_prefix = format!("{}: ", AGENT_LABEL);
    let mut turns: Vec<(Speaker, String)> = Vec::new();

    for line in rendered.split('\n') {
        if let Some(text) = line.strip_prefix(CONTINUATION_INDENT) {
            if let Some((_, turn)) = turns.last_mut() {
                turn.push('\n');
                turn.push_str(text);
            }
        } else if let Some(text) = line.strip_prefix(&user_prefix) {
            turns.push((Speaker::User, text.to_string()));
        } else if let Some(text) = line.strip_prefix(&agent_prefix) {
            turns.push((Speaker::Agent, text.to_string()));
        } else if let Some((_, text)) = turns.last_mut() {
            text.push('\n');
            text.push_str(line);
        }
    }

    turns
}
