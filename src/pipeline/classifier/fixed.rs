use super::{check_features, ClassProbabilities, ClassifierError, DiseaseClassifier};
use crate::pipeline::vectorize::SymptomVector;

/// Mock classifier for testing. Returns the same distribution for every vector.
pub struct FixedClassifier {
    classes: Vec<String>,
    probabilities: Vec<f64>,
    n_features: usize,
    fail: bool,
}

impl FixedClassifier {
    pub fn new(distribution: &[(&str, f64)], n_features: usize) -> Self {
        Self {
            classes: distribution.iter().map(|(c, _)| c.to_string()).collect(),
            probabilities: distribution.iter().map(|(_, p)| *p).collect(),
            n_features,
            fail: false,
        }
    }

    /// Every prediction fails as if the model were malformed.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl DiseaseClassifier for FixedClassifier {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, vector: &SymptomVector) -> Result<ClassProbabilities, ClassifierError> {
        check_features(self, vector)?;
        if self.fail {
            return Err(ClassifierError::MalformedModel(
                "fixed classifier configured to fail".into(),
            ));
        }
        ClassProbabilities::new(
            self.classes
                .iter()
                .cloned()
                .zip(self.probabilities.iter().copied())
                .collect(),
        )
    }
}
