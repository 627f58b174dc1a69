pub mod prompt;
pub mod policy;
pub mod parser;
pub mod orchestrator;

pub use prompt::*;
pub use policy::*;
pub use parser::*;
pub use orchestrator::*;

use thiserror::Error;

use crate::pipeline::inference::InferenceError;

/// Normalization never fails the request; these are logged and the
/// stage degrades to an empty ingredient set.
#[derive(Error, Debug)]
pub enum NormalizationError {
    #[error("Normalizer call failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Malformed normalizer response: {0}")]
    MalformedResponse(String),
}
