pub mod prompt;
pub mod parser;
pub mod review;
pub mod orchestrator;

pub use prompt::*;
pub use parser::*;
pub use review::*;
pub use orchestrator::*;

use thiserror::Error;

use crate::pipeline::inference::InferenceError;

/// Critique failed; the draft stands unreviewed.
#[derive(Error, Debug)]
pub enum CritiqueError {
    #[error("Critique call failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Malformed critique: {0}")]
    MalformedResponse(String),
}
