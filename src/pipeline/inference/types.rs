use serde::Serialize;

use super::InferenceError;

/// Sampling variance requested from the capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// Zero-variance sampling for judgment stages (extraction, normalizer, evaluators, critique).
    Deterministic,
    /// Higher variance for prose generation (synthesizer).
    Creative,
}

/// One call to an inference capability.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    pub model: String,
    /// Fixed template for the stage. Never contains user data.
    pub instruction: String,
    /// Structured or text payload the instruction applies to.
    pub payload: String,
    /// Base64-encoded images.
    pub images: Vec<String>,
    pub mode: SamplingMode,
    /// Ask the capability to constrain its output to JSON.
    pub expect_json: bool,
}

impl InferenceRequest {
    pub fn new(model: &str, instruction: &str, payload: impl Into<String>) -> Self {
        Self {
            model: model.to_string(),
            instruction: instruction.to_string(),
            payload: payload.into(),
            images: Vec::new(),
            mode: SamplingMode::Deterministic,
            expect_json: false,
        }
    }

    pub fn deterministic(mut self) -> Self {
        self.mode = SamplingMode::Deterministic;
        self
    }

    pub fn creative(mut self) -> Self {
        self.mode = SamplingMode::Creative;
        self
    }

    pub fn json(mut self) -> Self {
        self.expect_json = true;
        self
    }

    pub fn with_image(mut self, base64_image: String) -> Self {
        self.images.push(base64_image);
        self
    }
}

/// Inference capability abstraction (allows deterministic fakes in tests).
///
/// Calls block; async callers run them on the blocking pool.
pub trait InferenceClient: Send + Sync {
    fn invoke(&self, request: &InferenceRequest) -> Result<String, InferenceError>;
}
