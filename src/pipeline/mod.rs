pub mod normalize;
pub mod vectorize;
pub mod classifier;
pub mod rank;
pub mod orchestrator;

pub use orchestrator::{ErrorKind, PredictError, PredictionPipeline, RankedResult};
pub use rank::{Prediction, DEFAULT_TOP_K};
