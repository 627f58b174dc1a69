pub mod red_flag;
pub mod prompt;
pub mod orchestrator;

pub use red_flag::*;
pub use prompt::*;
pub use orchestrator::*;

use thiserror::Error;

use crate::pipeline::inference::InferenceError;

/// Narrative generation failed; the structured draft is used instead.
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Narrative call failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("Narrative was empty")]
    EmptyNarrative,
}
