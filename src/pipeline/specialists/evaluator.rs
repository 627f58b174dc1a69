use std::sync::Arc;

use super::parser::parse_evaluator_response;
use super::prompts::{
    build_evaluator_payload, evaluator_instruction, ADDITIVE_INSTRUCTION, ALLERGEN_INSTRUCTION,
    CELIAC_INSTRUCTION, METABOLIC_INSTRUCTION,
};
use super::registry::{CapabilitySpec, ADDITIVE, ALLERGEN, CELIAC, METABOLIC};
use super::EvaluatorError;
use crate::models::{EvaluatorVerdict, NormalizedIngredientSet};
use crate::pipeline::inference::{InferenceClient, InferenceRequest};

/// One condition-specific judgment unit.
///
/// Implementations must treat the ingredient set as read-only and keep no
/// state between calls; the dispatcher runs them concurrently.
pub trait Evaluator: Send + Sync {
    fn spec(&self) -> &CapabilitySpec;

    fn evaluate(
        &self,
        ingredients: &NormalizedIngredientSet,
    ) -> Result<EvaluatorVerdict, EvaluatorError>;
}

/// Evaluator backed by the inference capability with a fixed knowledge base.
pub struct LlmEvaluator {
    spec: CapabilitySpec,
    instruction: String,
    client: Arc<dyn InferenceClient>,
    model: String,
}

impl LlmEvaluator {
    pub fn new(
        spec: CapabilitySpec,
        knowledge: &str,
        client: Arc<dyn InferenceClient>,
        model: &str,
    ) -> Self {
        Self {
            spec,
            instruction: evaluator_instruction(knowledge),
            client,
            model: model.to_string(),
        }
    }
}

impl Evaluator for LlmEvaluator {
    fn spec(&self) -> &CapabilitySpec {
        &self.spec
    }

    fn evaluate(
        &self,
        ingredients: &NormalizedIngredientSet,
    ) -> Result<EvaluatorVerdict, EvaluatorError> {
        let payload = serde_json::to_string(ingredients)
            .map_err(|e| EvaluatorError::Payload(e.to_string()))?;

        let request = InferenceRequest::new(
            &self.model,
            &self.instruction,
            build_evaluator_payload(&payload),
        )
        .deterministic()
        .json();

        let reply = self.client.invoke(&request)?;
        parse_evaluator_response(self.spec.capability_name, &reply)
    }
}

/// The four default capabilities, all sharing one injected client.
pub fn default_evaluators(
    client: Arc<dyn InferenceClient>,
    model: &str,
) -> Vec<Arc<dyn Evaluator>> {
    [
        (CELIAC, CELIAC_INSTRUCTION),
        (METABOLIC, METABOLIC_INSTRUCTION),
        (ALLERGEN, ALLERGEN_INSTRUCTION),
        (ADDITIVE, ADDITIVE_INSTRUCTION),
    ]
    .into_iter()
    .map(|(spec, knowledge)| {
        Arc::new(LlmEvaluator::new(spec, knowledge, Arc::clone(&client), model))
            as Arc<dyn Evaluator>
    })
    .collect()
}
