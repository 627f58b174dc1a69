//! Inference capability: the narrow contract every semantic stage calls.
//!
//! Stages never talk to a model directly. They build an `InferenceRequest`
//! with a fixed instruction, hand it to an injected `InferenceClient`, and
//! validate the reply's shape themselves.

pub mod types;
pub mod ollama;
pub mod sanitize;
pub mod mock;

pub use types::*;
pub use ollama::*;
pub use sanitize::*;
pub use mock::*;

use thiserror::Error;

/// Both variants are recoverable by the calling stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    #[error("Inference capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("Malformed inference output: {0}")]
    MalformedOutput(String),
}
