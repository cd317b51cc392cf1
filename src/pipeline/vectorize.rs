//! Multi-hot symptom vectors aligned to the vocabulary's column order.

use serde::Serialize;

use crate::vocabulary::LabelVocabulary;

/// One 0/1 entry per vocabulary label, in vocabulary order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymptomVector {
    values: Vec<u8>,
}

impl SymptomVector {
    pub fn zeros(len: usize) -> Self {
        Self {
            values: vec![0; len],
        }
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Feature value as used by the classifier.
    pub fn feature(&self, index: usize) -> Option<f64> {
        self.values.get(index).map(|&v| f64::from(v))
    }

    /// No recognized symptoms.
    pub fn is_all_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0)
    }

    pub fn active_indices(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Inverse of [`vectorize`]: the labels whose columns are set.
    pub fn active_labels<'a>(&self, vocabulary: &'a LabelVocabulary) -> Vec<&'a str> {
        self.active_indices()
            .into_iter()
            .filter_map(|i| vocabulary.label_at(i))
            .collect()
    }
}

/// Set column i iff `vocabulary[i]` is among `symptoms`. Unknown symptoms are ignored.
pub fn vectorize<S: AsRef<str>>(vocabulary: &LabelVocabulary, symptoms: &[S]) -> SymptomVector {
    let mut vector = SymptomVector::zeros(vocabulary.len());
    for symptom in symptoms {
        if let Some(position) = vocabulary.position(symptom.as_ref()) {
            vector.values[position] = 1;
        }
    }
    vector
}
