//! Specialist evaluators and the dispatcher that fans out to them.
//!
//! Boundaries:
//! - `registry`: which capabilities exist and which conditions activate them
//! - `evaluator`: one capability's judgment over the normalized ingredients
//! - `dispatch`: concurrent invocation, isolation, and the per-request join

pub mod registry;
pub mod prompts;
pub mod parser;
pub mod evaluator;
pub mod dispatch;

pub use registry::*;
pub use prompts::*;
pub use parser::*;
pub use evaluator::*;
pub use dispatch::*;

use thiserror::Error;

use crate::pipeline::inference::InferenceError;

/// Failure of one evaluator. Recorded as that capability's ERROR verdict.
#[derive(Error, Debug)]
pub enum EvaluatorError {
    #[error("Evaluator call failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("Malformed verdict: {0}")]
    MalformedOutput(String),

    #[error("Could not prepare ingredient payload: {0}")]
    Payload(String),

    #[error("Timed out after {0} ms")]
    TimedOut(u128),

    #[error("Evaluator crashed: {0}")]
    Panicked(String),
}
