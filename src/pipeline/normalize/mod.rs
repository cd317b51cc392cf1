pub mod types;
pub mod prompt;
pub mod parser;
pub mod gemini;
pub mod ollama;
pub mod normalizer;

pub use types::*;
pub use prompt::*;
pub use parser::*;
pub use gemini::*;
pub use ollama::*;
pub use normalizer::*;

use thiserror::Error;

/// Failures talking to the text-generation service.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Text-generation service is not reachable at {0}")]
    Connection(String),

    #[error("Text-generation service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("No API key configured for {0}")]
    MissingApiKey(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

/// Why a matcher response could not be turned into a label list.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MatcherParseError {
    #[error("Matcher returned an empty response")]
    EmptyResponse,

    #[error("Matcher response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Matcher response is JSON but not an array")]
    NotAnArray,
}

/// Reason normalization fell back to the raw input.
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Symptom matcher call failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Symptom matcher output unusable: {0}")]
    Parse(#[from] MatcherParseError),
}
