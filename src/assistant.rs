//! Symptom assistant: the request-facing layer over the prediction pipeline.
//!
//! Turns typed or transcribed text into a symptom list, runs the pipeline and
//! attaches the top disease's description and precautions.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::knowledge::DiseaseKnowledge;
use crate::pipeline::{ErrorKind, PredictError, Prediction, PredictionPipeline};

#[derive(Error, Debug)]
pub enum AssessError {
    #[error("No symptoms detected in input")]
    EmptyInput,

    #[error(transparent)]
    Predict(#[from] PredictError),
}

impl AssessError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::EmptyInput => None,
            Self::Predict(e) => Some(e.kind()),
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyInput => "No symptoms detected. Please enter symptoms.",
            Self::Predict(e) => e.user_message(),
        }
    }
}

/// Everything a results view needs for one request.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    /// Symptoms as the user entered them.
    pub symptoms: Vec<String>,
    pub matched_symptoms: Vec<String>,
    pub normalization_degraded: bool,
    pub predictions: Vec<Prediction>,
    pub top_disease: String,
    pub description: String,
    pub precautions: Vec<String>,
    /// Diseases offered in the feedback form.
    pub all_diseases: Vec<String>,
}

static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,;\n\r]+").unwrap());

/// Split comma, semicolon or newline separated symptoms; trims and drops blanks.
pub fn parse_symptom_input(text: &str) -> Vec<String> {
    SEPARATOR
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct SymptomAssistant {
    pipeline: PredictionPipeline,
    knowledge: DiseaseKnowledge,
}

impl SymptomAssistant {
    pub fn new(pipeline: PredictionPipeline, knowledge: DiseaseKnowledge) -> Self {
        Self {
            pipeline,
            knowledge,
        }
    }

    pub fn pipeline(&self) -> &PredictionPipeline {
        &self.pipeline
    }

    pub fn knowledge(&self) -> &DiseaseKnowledge {
        &self.knowledge
    }

    /// Vocabulary labels sorted for symptom pickers; empty when the model is unavailable.
    pub fn symptom_options(&self) -> Vec<String> {
        self.pipeline
            .context()
            .map(|ctx| ctx.vocabulary().sorted_labels())
            .unwrap_or_default()
    }

    /// Known diseases: the knowledge base's list, else the classifier's classes.
    pub fn all_diseases(&self) -> Vec<String> {
        if !self.knowledge.diseases().is_empty() {
            return self.knowledge.diseases().to_vec();
        }
        self.pipeline
            .context()
            .map(|ctx| ctx.classifier().classes().to_vec())
            .unwrap_or_default()
    }

    pub fn assess(&self, text: &str) -> Result<Assessment, AssessError> {
        let symptoms = parse_symptom_input(text);
        if symptoms.is_empty() {
            return Err(AssessError::EmptyInput);
        }

        let ranked = self.pipeline.predict(&symptoms)?;
        let top_disease = ranked
            .top()
            .map(|p| p.disease.clone())
            .ok_or_else(|| PredictError::PredictionFailed("no predictions".into()))?;

        Ok(Assessment {
            description: self.knowledge.description(&top_disease).to_string(),
            precautions: self.knowledge.precautions(&top_disease),
            all_diseases: self.all_diseases(),
            symptoms,
            matched_symptoms: ranked.matched_symptoms,
            normalization_degraded: ranked.normalization_degraded,
            predictions: ranked.predictions,
            top_disease,
        })
    }
}
