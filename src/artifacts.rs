//! Startup loading of the vocabulary and classifier artifacts.
//!
//! Both files are produced by the training pipeline and read exactly once.
//! The resulting [`ModelContext`] is immutable and shared by every request.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::pipeline::classifier::{ClassifierError, DiseaseClassifier, ForestFile, RandomForest};
use crate::vocabulary::{LabelVocabulary, VocabularyError, VocabularyFile};

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Artifact not found: {0}")]
    Missing(PathBuf),

    #[error("Cannot read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Corrupt artifact {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("Invalid vocabulary: {0}")]
    Vocabulary(#[from] VocabularyError),

    #[error("Invalid classifier: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Classifier expects {classifier} features but vocabulary has {vocabulary} labels")]
    FeatureMismatch { vocabulary: usize, classifier: usize },
}

/// Immutable vocabulary + classifier pair, built once at startup.
pub struct ModelContext {
    vocabulary: LabelVocabulary,
    classifier: Box<dyn DiseaseClassifier + Send + Sync>,
}

impl fmt::Debug for ModelContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelContext")
            .field("labels", &self.vocabulary.len())
            .field("classes", &self.classifier.classes().len())
            .finish()
    }
}

impl ModelContext {
    /// Pair a vocabulary with a classifier trained on it.
    pub fn new(
        vocabulary: LabelVocabulary,
        classifier: Box<dyn DiseaseClassifier + Send + Sync>,
    ) -> Result<Self, ArtifactError> {
        if classifier.n_features() != vocabulary.len() {
            return Err(ArtifactError::FeatureMismatch {
                vocabulary: vocabulary.len(),
                classifier: classifier.n_features(),
            });
        }
        Ok(Self {
            vocabulary,
            classifier,
        })
    }

    /// Load `vocabulary_path` and the random-forest model at `classifier_path`.
    pub fn load(vocabulary_path: &Path, classifier_path: &Path) -> Result<Self, ArtifactError> {
        let vocabulary = load_vocabulary(vocabulary_path)?;
        let forest = load_forest(classifier_path)?;

        tracing::info!(
            labels = vocabulary.len(),
            vocabulary_version = vocabulary.version().unwrap_or("unversioned"),
            classes = forest.classes().len(),
            trees = forest.n_trees(),
            model_version = forest.version().unwrap_or("unversioned"),
            "Disease prediction model loaded"
        );

        Self::new(vocabulary, Box::new(forest))
    }

    pub fn vocabulary(&self) -> &LabelVocabulary {
        &self.vocabulary
    }

    pub fn classifier(&self) -> &(dyn DiseaseClassifier + Send + Sync) {
        self.classifier.as_ref()
    }
}

pub fn load_vocabulary(path: &Path) -> Result<LabelVocabulary, ArtifactError> {
    let file: VocabularyFile = read_json(path)?;
    Ok(LabelVocabulary::from_file(file)?)
}

pub fn load_forest(path: &Path) -> Result<RandomForest, ArtifactError> {
    let file: ForestFile = read_json(path)?;
    Ok(RandomForest::from_file(file)?)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::Missing(path.to_path_buf())
        } else {
            ArtifactError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    serde_json::from_slice(&bytes).map_err(|e| ArtifactError::Corrupt {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::json;

    pub fn vocabulary_json() -> serde_json::Value {
        json!({"version": "v1", "labels": ["fever", "cough", "headache"]})
    }

    /// Three features, three classes; fever → Flu, cough → Cold, else Migraine.
    pub fn forest_json() -> serde_json::Value {
        json!({
            "version": "v1",
            "n_features": 3,
            "classes": ["Flu", "Cold", "Migraine"],
            "trees": [
                {"nodes": [
                    {"split": {"feature": 0, "threshold": 0.5, "left": 1, "right": 4}},
                    {"split": {"feature": 1, "threshold": 0.5, "left": 2, "right": 3}},
                    {"leaf": {"value": [1.0, 1.0, 8.0]}},
                    {"leaf": {"value": [2.0, 7.0, 1.0]}},
                    {"leaf": {"value": [7.0, 2.0, 1.0]}}
                ]}
            ]
        })
    }
}
