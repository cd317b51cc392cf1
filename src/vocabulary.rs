//! Label vocabulary: the ordered symptom labels the classifier was trained on.
//!
//! The vocabulary fixes the column layout of every symptom vector, so it is
//! immutable once loaded and shared read-only by the normalizer, the
//! vectorizer and the classifier.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VocabularyError {
    #[error("Vocabulary contains no labels")]
    Empty,

    #[error("Vocabulary label at position {0} is blank")]
    BlankLabel(usize),

    #[error("Duplicate vocabulary label \"{label}\" at position {position}")]
    DuplicateLabel { label: String, position: usize },
}

/// Ordered, deduplicated set of symptom labels.
#[derive(Debug, Clone)]
pub struct LabelVocabulary {
    labels: Vec<String>,
    index: HashMap<String, usize>,
    version: Option<String>,
}

/// On-disk shape of the vocabulary artifact.
#[derive(Debug, Serialize, Deserialize)]
pub struct VocabularyFile {
    #[serde(default)]
    pub version: Option<String>,
    pub labels: Vec<String>,
}

impl LabelVocabulary {
    /// Build a vocabulary, rejecting empty, blank or duplicated labels.
    pub fn new(labels: Vec<String>) -> Result<Self, VocabularyError> {
        if labels.is_empty() {
            return Err(VocabularyError::Empty);
        }

        let mut index = HashMap::with_capacity(labels.len());
        for (position, label) in labels.iter().enumerate() {
            if label.trim().is_empty() {
                return Err(VocabularyError::BlankLabel(position));
            }
            if index.insert(label.clone(), position).is_some() {
                return Err(VocabularyError::DuplicateLabel {
                    label: label.clone(),
                    position,
                });
            }
        }

        Ok(Self {
            labels,
            index,
            version: None,
        })
    }

    pub fn from_file(file: VocabularyFile) -> Result<Self, VocabularyError> {
        let mut vocabulary = Self::new(file.labels)?;
        vocabulary.version = file.version;
        Ok(vocabulary)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Exact (case-sensitive) membership test.
    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Column position of a label in every symptom vector.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn label_at(&self, position: usize) -> Option<&str> {
        self.labels.get(position).map(String::as_str)
    }

    /// Labels in alphabetical order, for symptom pickers.
    pub fn sorted_labels(&self) -> Vec<String> {
        let mut sorted = self.labels.clone();
        sorted.sort();
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn positions_follow_input_order() {
        let vocab = LabelVocabulary::new(labels(&["fever", "cough", "headache"])).unwrap();
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.position("fever"), Some(0));
        assert_eq!(vocab.position("headache"), Some(2));
        assert_eq!(vocab.label_at(1), Some("cough"));
        assert_eq!(vocab.position("nausea"), None);
    }

    #[test]
    fn membership_is_exact() {
        let vocab = LabelVocabulary::new(labels(&["abdominal pain"])).unwrap();
        assert!(vocab.contains("abdominal pain"));
        assert!(!vocab.contains("Abdominal Pain"));
        assert!(!vocab.contains("abdominal pain "));
    }

    #[test]
    fn rejects_empty_vocabulary() {
        assert_eq!(
            LabelVocabulary::new(vec![]).unwrap_err(),
            VocabularyError::Empty
        );
    }

    #[test]
    fn rejects_duplicates() {
        let err = LabelVocabulary::new(labels(&["fever", "cough", "fever"])).unwrap_err();
        assert_eq!(
            err,
            VocabularyError::DuplicateLabel {
                label: "fever".into(),
                position: 2
            }
        );
    }

    #[test]
    fn rejects_blank_labels() {
        let err = LabelVocabulary::new(labels(&["fever", "  "])).unwrap_err();
        assert_eq!(err, VocabularyError::BlankLabel(1));
    }

    #[test]
    fn sorted_labels_leave_column_order_untouched() {
        let vocab = LabelVocabulary::new(labels(&["vomiting", "chills", "itching"])).unwrap();
        assert_eq!(vocab.sorted_labels(), labels(&["chills", "itching", "vomiting"]));
        assert_eq!(vocab.label_at(0), Some("vomiting"));
    }

    #[test]
    fn from_file_keeps_version() {
        let file: VocabularyFile =
            serde_json::from_str(r#"{"version": "2024-03", "labels": ["fever"]}"#).unwrap();
        let vocab = LabelVocabulary::from_file(file).unwrap();
        assert_eq!(vocab.version(), Some("2024-03"));
    }

    #[test]
    fn version_is_optional() {
        let file: VocabularyFile = serde_json::from_str(r#"{"labels": ["fever"]}"#).unwrap();
        let vocab = LabelVocabulary::from_file(file).unwrap();
        assert!(vocab.version().is_none());
    }
}
