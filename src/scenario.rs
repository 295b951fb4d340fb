use serde::{Deserialize, Serialize};

const DEFAULT_AGENT_PROMPT: &str = "\
You are a CEO of a technology company.
You are anxious about upcoming quarterly results and are pressuring your senior managers to deliver faster.
You have summoned your senior manager to a 1:1 meeting to discuss the situation and pressure them to deliver faster.";

const DEFAULT_SCENARIO_DESCRIPTION: &str = "\
I am a senior manager in a technology company.
I am facing pressure to compress timelines and deliverables, but my team is adamant that we cannot do it.
My CEO has approached me to discuss the situation and pressure me to speed up the project.";

const DEFAULT_FEEDBACK_AREAS: [&str; 3] = ["Communication clarity", "Active listening", "Empathy"];

/// What the user wants to rehearse and how the agent should behave
///
/// Editable before a session starts; the session controller refuses edits
/// while connecting or connected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// The user's own description of the conversation and its goal
    pub scenario_description: String,

    /// Persona prompt sent to the agent right after connecting
    pub agent_prompt: String,

    /// Areas the evaluation should focus on (deduplicated, insertion order)
    #[serde(default)]
    feedback_areas: Vec<String>,
}

impl ScenarioConfig {
    pub fn new(
        scenario_description: impl Into<String>,
        agent_prompt: impl Into<String>,
        feedback_areas: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut config = Self {
            scenario_description: scenario_description.into(),
            agent_prompt: agent_prompt.into(),
            feedback_areas: Vec::new(),
        };
        for area in feedback_areas {
            config.add_feedback_area(&area);
        }
        config
    }

    /// Both description and prompt are non-empty after trimming
    pub fn is_complete(&self) -> bool {
        !self.scenario_description.trim().is_empty() && !self.agent_prompt.trim().is_empty()
    }

    pub fn feedback_areas(&self) -> &[String] {
        &self.feedback_areas
    }

    /// Add a trimmed feedback area. Returns false for blanks and duplicates.
    pub fn add_feedback_area(&mut self, area: &str) -> bool {
        let area = area.trim();
        if area.is_empty() || self.feedback_areas.iter().any(|a| a == area) {
            return false;
        }
        self.feedback_areas.push(area.to_string());
        true
    }

    /// Remove a feedback area. Returns false when it was not present.
    pub fn remove_feedback_area(&mut self, area: &str) -> bool {
        let before = self.feedback_areas.len();
        self.feedback_areas.retain(|a| a != area.trim());
        self.feedback_areas.len() != before
    }

    /// Re-apply dedup/trim rules, e.g. after deserializing user input
    pub fn normalized(self) -> Self {
        Self::new(self.scenario_description, self.agent_prompt, self.feedback_areas)
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_SCENARIO_DESCRIPTION,
            DEFAULT_AGENT_PROMPT,
            DEFAULT_FEEDBACK_AREAS.iter().map(|a| a.to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_areas_are_trimmed_and_deduplicated() {
        let mut config = ScenarioConfig::new("d", "p", Vec::new());
        assert!(config.add_feedback_area("  Empathy "));
        assert!(!config.add_feedback_area("Empathy"));
        assert!(!config.add_feedback_area("   "));
        assert!(config.add_feedback_area("Clarity"));
        assert_eq!(config.feedback_areas(), ["Empathy", "Clarity"]);

        assert!(config.remove_feedback_area("Empathy"));
        assert!(!config.remove_feedback_area("Empathy"));
        assert_eq!(config.feedback_areas(), ["Clarity"]);
    }

    #[test]
    fn whitespace_only_fields_are_incomplete() {
        assert!(!ScenarioConfig::new("  ", "prompt", Vec::new()).is_complete());
        assert!(!ScenarioConfig::new("desc", "\n\t", Vec::new()).is_complete());
        assert!(ScenarioConfig::default().is_complete());
    }
}
