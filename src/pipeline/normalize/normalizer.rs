use super::parser::{parse_matcher_response, retain_vocabulary_labels};
use super::prompt::{build_matching_prompt, MATCHING_SYSTEM_PROMPT};
use super::types::{Normalization, TextGenerator};
use super::NormalizeError;
use crate::vocabulary::LabelVocabulary;

/// Maps free-text symptom phrases onto vocabulary labels through an external
/// text-generation service:
/// prompt → generate → parse → vocabulary filter
///
/// The service is untrusted. Its reply is parsed into a typed result and
/// filtered against the vocabulary; any failure falls back to the raw input.
pub struct SymptomNormalizer {
    generator: Box<dyn TextGenerator + Send + Sync>,
    model_name: String,
}

impl SymptomNormalizer {
    pub fn new(generator: Box<dyn TextGenerator + Send + Sync>, model_name: &str) -> Self {
        Self {
            generator,
            model_name: model_name.to_string(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// One matcher call per invocation, no retries.
    pub fn normalize(&self, vocabulary: &LabelVocabulary, raw_symptoms: &[String]) -> Normalization {
        if raw_symptoms.is_empty() {
            return Normalization::Matched(Vec::new());
        }

        match self.match_labels(vocabulary, raw_symptoms) {
            Ok(labels) => {
                tracing::debug!(
                    raw = raw_symptoms.len(),
                    matched = labels.len(),
                    labels = ?labels,
                    "Symptoms mapped onto vocabulary"
                );
                Normalization::Matched(labels)
            }
            Err(reason) => {
                tracing::warn!(
                    model = %self.model_name,
                    error = %reason,
                    "Symptom matcher unusable, using raw symptoms"
                );
                Normalization::Degraded {
                    symptoms: raw_symptoms.to_vec(),
                    reason,
                }
            }
        }
    }

    fn match_labels(
        &self,
        vocabulary: &LabelVocabulary,
        raw_symptoms: &[String],
    ) -> Result<Vec<String>, NormalizeError> {
        let prompt = build_matching_prompt(vocabulary.labels(), raw_symptoms);
        let response = self
            .generator
            .generate(&self.model_name, &prompt, MATCHING_SYSTEM_PROMPT)?;
        let labels = parse_matcher_response(&response)?;
        Ok(retain_vocabulary_labels(labels, vocabulary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::normalize::ollama::MockTextGenerator;
    use crate::pipeline::normalize::MatcherParseError;

    fn vocab() -> LabelVocabulary {
        LabelVocabulary::new(vec!["fever".into(), "cough".into(), "headache".into()]).unwrap()
    }

    fn raw(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn normalizer(generator: MockTextGenerator) -> SymptomNormalizer {
        SymptomNormalizer::new(Box::new(generator), "gemini-1.5-pro")
    }

    #[test]
    fn maps_phrases_to_labels() {
        let n = normalizer(MockTextGenerator::new(r#"["fever", "cough"]"#));
        let result = n.normalize(&vocab(), &raw(&["high temperature", "bad cough"]));
        assert!(!result.is_degraded());
        assert_eq!(result.symptoms(), &["fever", "cough"]);
    }

    #[test]
    fn out_of_vocabulary_labels_are_dropped() {
        let n = normalizer(MockTextGenerator::new(r#"["fever", "runny nose", "Headache"]"#));
        let result = n.normalize(&vocab(), &raw(&["hot", "sniffles"]));
        assert!(!result.is_degraded());
        assert_eq!(result.into_symptoms(), vec!["fever"]);
    }

    #[test]
    fn empty_array_means_nothing_matched() {
        let n = normalizer(MockTextGenerator::new("[]"));
        let result = n.normalize(&vocab(), &raw(&["xyz123"]));
        assert!(!result.is_degraded());
        assert!(result.symptoms().is_empty());
    }

    #[test]
    fn matcher_failure_returns_raw_input_unchanged() {
        let n = normalizer(MockTextGenerator::failing("http://matcher.invalid"));
        let input = raw(&["  tummy hurts", "Fever"]);
        let result = n.normalize(&vocab(), &input);

        assert!(result.is_degraded());
        assert!(matches!(
            result,
            Normalization::Degraded {
                reason: NormalizeError::Generation(_),
                ..
            }
        ));
        assert_eq!(result.into_symptoms(), input);
    }

    #[test]
    fn unparsable_output_returns_raw_input_unchanged() {
        let n = normalizer(MockTextGenerator::new("Sure! The symptoms are fever."));
        let input = raw(&["hot forehead"]);
        let result = n.normalize(&vocab(), &input);

        assert!(matches!(
            &result,
            Normalization::Degraded {
                reason: NormalizeError::Parse(MatcherParseError::InvalidJson(_)),
                ..
            }
        ));
        assert_eq!(result.into_symptoms(), input);
    }

    #[test]
    fn non_array_output_returns_raw_input() {
        let n = normalizer(MockTextGenerator::new(r#"{"matched": ["fever"]}"#));
        let input = raw(&["fever"]);
        let result = n.normalize(&vocab(), &input);
        assert!(result.is_degraded());
        assert_eq!(result.into_symptoms(), input);
    }

    #[test]
    fn empty_output_returns_raw_input() {
        let n = normalizer(MockTextGenerator::new(""));
        let input = raw(&["cough"]);
        let result = n.normalize(&vocab(), &input);
        assert!(result.is_degraded());
        assert_eq!(result.into_symptoms(), input);
    }

    #[test]
    fn empty_input_skips_the_matcher() {
        let generator = std::sync::Arc::new(MockTextGenerator::new(r#"["fever"]"#));
        let n = SymptomNormalizer::new(Box::new(SharedMock(generator.clone())), "m");
        let result = n.normalize(&vocab(), &[]);
        assert!(result.symptoms().is_empty());
        assert_eq!(generator.call_count(), 0);
    }

    #[test]
    fn one_call_per_invocation() {
        let generator = std::sync::Arc::new(MockTextGenerator::new(r#"["cough"]"#));
        let n = SymptomNormalizer::new(Box::new(SharedMock(generator.clone())), "m");
        n.normalize(&vocab(), &raw(&["coughing"]));
        n.normalize(&vocab(), &raw(&["coughing"]));
        assert_eq!(generator.call_count(), 2);
    }

    struct SharedMock(std::sync::Arc<MockTextGenerator>);

    impl TextGenerator for SharedMock {
        fn generate(
            &self,
            model: &str,
            prompt: &str,
            system: &str,
        ) -> Result<String, crate::pipeline::normalize::GenerationError> {
            self.0.generate(model, prompt, system)
        }
    }
}
