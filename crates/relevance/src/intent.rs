use serde::{Deserialize, Serialize};

/// The stated intent a run ranks against: who is asking, and what they need
/// to get done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// Target persona, e.g. "Investment Analyst"
    pub persona: String,

    /// Job to be done, e.g. "Analyze revenue trends and R&D investments"
    pub task: String,
}

impl Intent {
    /// Create an intent from persona and task strings
    pub fn new(persona: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            task: task.into(),
        }
    }

    /// Query text embedded when ranking fragments and sentences
    #[must_use]
    pub fn ranking_query(&self) -> String {
        format!("Role: {}\nTask: {}", self.persona, self.task)
    }

    /// Query text embedded when assembling the cohesive summary.
    ///
    /// Phrased as a first-person prompt; this framing pulls the encoder
    /// toward actionable passages rather than section headers.
    #[must_use]
    pub fn summary_query(&self) -> String {
        format!(
            "As a {}, I need to {}. Key focus areas and insights:",
            self.persona, self.task
        )
    }
}
