use super::{GenerationError, NormalizeError};

/// Text-generation service abstraction (allows mocking).
pub trait TextGenerator {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
    ) -> Result<String, GenerationError>;
}

/// Result of mapping raw phrases onto the vocabulary.
#[derive(Debug)]
pub enum Normalization {
    /// Matcher output parsed; every label is a vocabulary member.
    Matched(Vec<String>),
    /// Matcher unavailable or unusable; carries the raw input unchanged.
    Degraded {
        symptoms: Vec<String>,
        reason: NormalizeError,
    },
}

impl Normalization {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Normalization::Degraded { .. })
    }

    pub fn symptoms(&self) -> &[String] {
        match self {
            Normalization::Matched(labels) => labels,
            Normalization::Degraded { symptoms, .. } => symptoms,
        }
    }

    pub fn into_symptoms(self) -> Vec<String> {
        match self {
            Normalization::Matched(labels) => labels,
            Normalization::Degraded { symptoms, .. } => symptoms,
        }
    }
}
