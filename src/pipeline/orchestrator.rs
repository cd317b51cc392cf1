use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::classifier::ClassifierError;
use super::normalize::{Normalization, SymptomNormalizer};
use super::rank::{rank, Prediction, DEFAULT_TOP_K};
use super::vectorize::vectorize;
use crate::artifacts::{ArtifactError, ModelContext};

/// Every outcome a caller can observe besides a ranked result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Artifacts missing or corrupt at startup; terminal until restart.
    InitializationFailed,
    /// No input phrase mapped onto a vocabulary label.
    NoRecognizedSymptoms,
    /// Matcher failed; raw input was used instead. Never returned as an error.
    NormalizationDegraded,
    /// Classification or ranking failed.
    PredictionFailed,
}

impl ErrorKind {
    /// Text shown to the end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InitializationFailed => {
                "The prediction model is unavailable right now. Please try again later."
            }
            Self::NoRecognizedSymptoms => {
                "We couldn't recognize those symptoms. Please rephrase them and try again."
            }
            Self::NormalizationDegraded | Self::PredictionFailed => {
                "Something went wrong while predicting. Please try again."
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Prediction model unavailable: {0}")]
    InitializationFailed(String),

    #[error("No symptoms matched the trained vocabulary")]
    NoRecognizedSymptoms,

    #[error("Prediction failed: {0}")]
    PredictionFailed(String),
}

impl PredictError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InitializationFailed(_) => ErrorKind::InitializationFailed,
            Self::NoRecognizedSymptoms => ErrorKind::NoRecognizedSymptoms,
            Self::PredictionFailed(_) => ErrorKind::PredictionFailed,
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}

impl From<ClassifierError> for PredictError {
    fn from(e: ClassifierError) -> Self {
        PredictError::PredictionFailed(e.to_string())
    }
}

/// Top-K predictions for one request.
#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    pub predictions: Vec<Prediction>,
    /// Vocabulary labels that made it into the symptom vector.
    pub matched_symptoms: Vec<String>,
    /// The matcher was unusable and raw input was vectorized directly.
    pub normalization_degraded: bool,
}

impl RankedResult {
    pub fn top(&self) -> Option<&Prediction> {
        self.predictions.first()
    }
}

/// Readiness is decided once, when the pipeline is built.
enum PipelineState {
    Ready(ModelContext),
    Unavailable(String),
}

/// Composes the full prediction pipeline:
/// normalize → vectorize → classify → rank
///
/// Holds only immutable state, so one instance serves concurrent requests
/// without locking.
pub struct PredictionPipeline {
    state: PipelineState,
    normalizer: SymptomNormalizer,
    top_k: usize,
}

impl PredictionPipeline {
    pub fn new(context: ModelContext, normalizer: SymptomNormalizer) -> Self {
        Self {
            state: PipelineState::Ready(context),
            normalizer,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// A pipeline that refuses every prediction with `InitializationFailed`.
    pub fn unavailable(reason: &str, normalizer: SymptomNormalizer) -> Self {
        Self {
            state: PipelineState::Unavailable(reason.to_string()),
            normalizer,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Build from a load attempt; a failed load leaves the pipeline unavailable.
    pub fn from_load(
        loaded: Result<ModelContext, ArtifactError>,
        normalizer: SymptomNormalizer,
    ) -> Self {
        match loaded {
            Ok(context) => Self::new(context, normalizer),
            Err(e) => {
                tracing::error!(error = %e, "Disease prediction model failed to load");
                Self::unavailable(&e.to_string(), normalizer)
            }
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, PipelineState::Ready(_))
    }

    pub fn context(&self) -> Option<&ModelContext> {
        match &self.state {
            PipelineState::Ready(context) => Some(context),
            PipelineState::Unavailable(_) => None,
        }
    }

    pub fn predict(&self, raw_symptoms: &[String]) -> Result<RankedResult, PredictError> {
        let _span = tracing::info_span!(
            "predict",
            request_id = %Uuid::new_v4(),
            symptoms = raw_symptoms.len()
        )
        .entered();

        let context = match &self.state {
            PipelineState::Ready(context) => context,
            PipelineState::Unavailable(reason) => {
                return Err(PredictError::InitializationFailed(reason.clone()))
            }
        };
        let vocabulary = context.vocabulary();

        // Step 1: Map phrases onto vocabulary labels (fallback-safe)
        let normalization = self.normalizer.normalize(vocabulary, raw_symptoms);
        let normalization_degraded = normalization.is_degraded();
        if let Normalization::Degraded { reason, .. } = &normalization {
            tracing::warn!(kind = ?ErrorKind::NormalizationDegraded, error = %reason, "Continuing with unnormalized symptoms");
        }

        // Step 2: Multi-hot vector in vocabulary order
        let vector = vectorize(vocabulary, normalization.symptoms());

        // Step 3: Nothing recognized is an expected outcome, not a fault
        if vector.is_all_zero() {
            tracing::info!(
                degraded = normalization_degraded,
                "No matching symptoms found in training data"
            );
            return Err(PredictError::NoRecognizedSymptoms);
        }

        let matched_symptoms: Vec<String> = vector
            .active_labels(vocabulary)
            .into_iter()
            .map(str::to_string)
            .collect();

        // Step 4: Classify and keep the top K
        let probabilities = context
            .classifier()
            .predict_proba(&vector)
            .map_err(|e| {
                tracing::error!(error = %e, "Disease classifier failed");
                PredictError::from(e)
            })?;

        let predictions = rank(&probabilities, self.top_k);
        if predictions.is_empty() {
            tracing::error!("Ranking produced no predictions");
            return Err(PredictError::PredictionFailed(
                "ranking produced no predictions".into(),
            ));
        }

        tracing::info!(
            matched = matched_symptoms.len(),
            top = %predictions[0].disease,
            confidence = %predictions[0].confidence,
            "Disease prediction complete"
        );

        Ok(RankedResult {
            predictions,
            matched_symptoms,
            normalization_degraded,
        })
    }
}
