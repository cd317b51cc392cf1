pub mod config;
pub mod vocabulary;
pub mod artifacts;
pub mod pipeline;
pub mod knowledge;
pub mod feedback;
pub mod assistant;

use tracing_subscriber::EnvFilter;

pub use artifacts::{ArtifactError, ModelContext};
pub use assistant::{Assessment, AssessError, SymptomAssistant};
pub use pipeline::{ErrorKind, PredictError, Prediction, PredictionPipeline, RankedResult};
pub use vocabulary::LabelVocabulary;

/// Initialize tracing; `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Load every startup artifact and assemble the assistant.
///
/// A failed model load does not abort: the returned assistant answers every
/// prediction with `InitializationFailed` until the process restarts.
pub fn build_assistant(cfg: &config::TriageConfig) -> Result<SymptomAssistant, pipeline::normalize::GenerationError> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let normalizer = cfg.matcher.build_normalizer()?;
    let loaded = ModelContext::load(&cfg.vocabulary_path(), &cfg.classifier_path());
    let pipeline = PredictionPipeline::from_load(loaded, normalizer).with_top_k(cfg.top_k);
    let knowledge =
        knowledge::DiseaseKnowledge::load_or_empty(&cfg.description_path(), &cfg.precaution_path());

    Ok(SymptomAssistant::new(pipeline, knowledge))
}
