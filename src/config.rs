use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::normalize::{
    GeminiClient, GenerationError, OllamaClient, SymptomNormalizer, TextGenerator,
    GEMINI_DEFAULT_BASE_URL,
};
use crate::pipeline::DEFAULT_TOP_K;

/// Application-level constants
pub const APP_NAME: &str = "symptom-triage";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_MODEL_DIR: &str = "saved_models";
const DEFAULT_DATASET_DIR: &str = "dataset";
const VOCABULARY_FILE: &str = "vocabulary.json";
const CLASSIFIER_FILE: &str = "disease_model.json";
const DESCRIPTION_FILE: &str = "symptom_Description.csv";
const PRECAUTION_FILE: &str = "symptom_precaution.csv";
const FEEDBACK_FILE: &str = "feedback.csv";

const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_OLLAMA_MODEL: &str = "medllama2";
const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MATCHER_TIMEOUT_SECS: u64 = 60;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "symptom_triage=info"
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown symptom matcher provider \"{0}\" (expected gemini or ollama)")]
    UnknownProvider(String),

    #[error("{key} must be a positive integer, got \"{value}\"")]
    InvalidNumber { key: &'static str, value: String },
}

/// Which text-generation service maps symptoms onto the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherProvider {
    Gemini,
    Ollama,
}

impl MatcherProvider {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ConfigError::UnknownProvider(value.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatcherConfig {
    pub provider: MatcherProvider,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl MatcherConfig {
    pub fn build_generator(&self) -> Result<Box<dyn TextGenerator + Send + Sync>, GenerationError> {
        let generator: Box<dyn TextGenerator + Send + Sync> = match self.provider {
            MatcherProvider::Gemini => Box::new(GeminiClient::new(
                &self.base_url,
                self.api_key.clone(),
                self.timeout_secs,
            )?),
            MatcherProvider::Ollama => {
                Box::new(OllamaClient::new(&self.base_url, self.timeout_secs)?)
            }
        };
        Ok(generator)
    }

    pub fn build_normalizer(&self) -> Result<SymptomNormalizer, GenerationError> {
        if self.provider == MatcherProvider::Gemini && self.api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set; symptom matching will fall back to raw input");
        }
        Ok(SymptomNormalizer::new(self.build_generator()?, &self.model))
    }
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    pub model_dir: PathBuf,
    pub dataset_dir: PathBuf,
    pub feedback_path: PathBuf,
    pub top_k: usize,
    pub matcher: MatcherConfig,
}

impl TriageConfig {
    /// Read `.env` (if present) then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let model_dir = get("SYMPTOM_TRIAGE_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR));
        let dataset_dir = get("SYMPTOM_TRIAGE_DATASET_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_DIR));
        let feedback_path = get("SYMPTOM_TRIAGE_FEEDBACK_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| dataset_dir.join(FEEDBACK_FILE));

        let top_k = match get("SYMPTOM_TRIAGE_TOP_K") {
            Some(v) => parse_positive("SYMPTOM_TRIAGE_TOP_K", &v)? as usize,
            None => DEFAULT_TOP_K,
        };

        let provider = match get("SYMPTOM_MATCHER_PROVIDER") {
            Some(v) => MatcherProvider::parse(&v)?,
            None => MatcherProvider::Gemini,
        };
        let (default_model, default_url) = match provider {
            MatcherProvider::Gemini => (DEFAULT_GEMINI_MODEL, GEMINI_DEFAULT_BASE_URL),
            MatcherProvider::Ollama => (DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_BASE_URL),
        };
        let timeout_secs = match get("SYMPTOM_MATCHER_TIMEOUT_SECS") {
            Some(v) => parse_positive("SYMPTOM_MATCHER_TIMEOUT_SECS", &v)?,
            None => DEFAULT_MATCHER_TIMEOUT_SECS,
        };

        let matcher = MatcherConfig {
            provider,
            model: get("SYMPTOM_MATCHER_MODEL").unwrap_or_else(|| default_model.to_string()),
            base_url: get("SYMPTOM_MATCHER_BASE_URL").unwrap_or_else(|| default_url.to_string()),
            api_key: get("GEMINI_API_KEY"),
            timeout_secs,
        };

        Ok(Self {
            model_dir,
            dataset_dir,
            feedback_path,
            top_k,
            matcher,
        })
    }

    pub fn vocabulary_path(&self) -> PathBuf {
        self.model_dir.join(VOCABULARY_FILE)
    }

    pub fn classifier_path(&self) -> PathBuf {
        self.model_dir.join(CLASSIFIER_FILE)
    }

    pub fn description_path(&self) -> PathBuf {
        self.dataset_dir.join(DESCRIPTION_FILE)
    }

    pub fn precaution_path(&self) -> PathBuf {
        self.dataset_dir.join(PRECAUTION_FILE)
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        }),
    }
}
