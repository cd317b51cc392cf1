//! Top-K selection over classifier probabilities.

use std::cmp::Ordering;

use serde::Serialize;

use super::classifier::ClassProbabilities;

/// Number of predictions returned per request.
pub const DEFAULT_TOP_K: usize = 3;

/// One ranked disease with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub disease: String,
    pub probability: f64,
    /// Percentage with two decimals, e.g. "87.50%".
    pub confidence: String,
}

impl Prediction {
    pub fn new(disease: &str, probability: f64) -> Self {
        Self {
            disease: disease.to_string(),
            probability,
            confidence: format_confidence(probability),
        }
    }
}

pub fn format_confidence(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// Highest `k` classes by probability, descending. The sort is stable so
/// ties keep the classifier's class order.
pub fn rank(probabilities: &ClassProbabilities, k: usize) -> Vec<Prediction> {
    let mut ordered: Vec<&(String, f64)> = probabilities.entries().iter().collect();
    ordered.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ordered
        .into_iter()
        .take(k)
        .map(|(disease, p)| Prediction::new(disease, *p))
        .collect()
}
