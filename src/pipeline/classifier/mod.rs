pub mod forest;
pub mod fixed;

pub use forest::*;
pub use fixed::*;

use serde::Serialize;
use thiserror::Error;

use crate::pipeline::vectorize::SymptomVector;

/// Probabilities must sum to 1 within this tolerance.
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Symptom vector has {actual} features, classifier expects {expected}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("Invalid probability {value} for class \"{class}\"")]
    InvalidProbability { class: String, value: f64 },

    #[error("Probabilities sum to {0}, expected 1")]
    NotNormalized(f64),

    #[error("Classifier returned no classes")]
    NoClasses,

    #[error("Malformed classifier model: {0}")]
    MalformedModel(String),
}

/// Pre-trained disease classifier. Implementations hold no per-request
/// state so a single instance serves concurrent predictions.
pub trait DiseaseClassifier {
    /// Disease classes in the classifier's own order.
    fn classes(&self) -> &[String];

    /// Number of features expected in each symptom vector.
    fn n_features(&self) -> usize;

    fn predict_proba(&self, vector: &SymptomVector) -> Result<ClassProbabilities, ClassifierError>;
}

/// Probability per disease class, in classifier class order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassProbabilities {
    entries: Vec<(String, f64)>,
}

impl ClassProbabilities {
    /// Validates that every probability is finite and non-negative and
    /// that together they sum to 1.
    pub fn new(entries: Vec<(String, f64)>) -> Result<Self, ClassifierError> {
        if entries.is_empty() {
            return Err(ClassifierError::NoClasses);
        }

        for (class, value) in &entries {
            if !value.is_finite() || *value < 0.0 {
                return Err(ClassifierError::InvalidProbability {
                    class: class.clone(),
                    value: *value,
                });
            }
        }

        let sum: f64 = entries.iter().map(|(_, p)| p).sum();
        if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(ClassifierError::NotNormalized(sum));
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, class: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(c, _)| c == class)
            .map(|(_, p)| *p)
    }
}

pub(crate) fn check_features(
    classifier: &dyn DiseaseClassifier,
    vector: &SymptomVector,
) -> Result<(), ClassifierError> {
    if vector.len() != classifier.n_features() {
        return Err(ClassifierError::FeatureMismatch {
            expected: classifier.n_features(),
            actual: vector.len(),
        });
    }
    Ok(())
}
