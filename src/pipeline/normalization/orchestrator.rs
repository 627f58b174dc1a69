use std::sync::Arc;
use std::time::Instant;

use super::parser::{parse_normalizer_response, RawNormalizedIngredient};
use super::policy::{canonical_name, hidden_components, risk_tags};
use super::prompt::{build_normalizer_payload, NORMALIZER_INSTRUCTION};
use super::NormalizationError;
use crate::models::{NormalizedIngredient, NormalizedIngredientSet};
use crate::pipeline::inference::{sanitize_for_prompt, InferenceClient, InferenceRequest};

/// Maps extracted label text onto canonical, risk-tagged ingredients.
pub struct Normalizer {
    client: Arc<dyn InferenceClient>,
    model: String,
    max_input_chars: usize,
}

impl Normalizer {
    pub fn new(client: Arc<dyn InferenceClient>, model: &str, max_input_chars: usize) -> Self {
        Self {
            client,
            model: model.to_string(),
            max_input_chars,
        }
    }

    /// Normalize label text. Fail-open: any delegate failure or malformed
    /// reply yields an empty set, which downstream reads as "no findings".
    pub fn normalize(&self, ingredient_text: &str) -> NormalizedIngredientSet {
        let _span = tracing::info_span!("normalize").entered();
        let start = Instant::now();

        match self.try_normalize(ingredient_text) {
            Ok(set) => {
                tracing::info!(
                    elapsed_ms = %start.elapsed().as_millis(),
                    ingredients = set.len(),
                    tags = set.risk_tags().len(),
                    "Ingredients normalized"
                );
                set
            }
            Err(e) => {
                tracing::warn!(
                    elapsed_ms = %start.elapsed().as_millis(),
                    error = %e,
                    "Normalization failed, continuing with no ingredients"
                );
                NormalizedIngredientSet::empty()
            }
        }
    }

    fn try_normalize(
        &self,
        ingredient_text: &str,
    ) -> Result<NormalizedIngredientSet, NormalizationError> {
        let text = sanitize_for_prompt(ingredient_text, self.max_input_chars);
        if text.is_empty() {
            return Ok(NormalizedIngredientSet::empty());
        }

        let request = InferenceRequest::new(
            &self.model,
            NORMALIZER_INSTRUCTION,
            build_normalizer_payload(&text),
        )
        .deterministic()
        .json();

        let reply = self.client.invoke(&request)?;
        let raw = parse_normalizer_response(&reply)?;

        Ok(NormalizedIngredientSet::new(
            raw.into_iter().map(apply_policy).collect(),
        ))
    }
}

/// Apply canonicalization, composite expansion and tagging to one delegate item.
pub fn apply_policy(raw: RawNormalizedIngredient) -> NormalizedIngredient {
    let canonical = canonical_name(&raw.original_term, &raw.scientific_name);
    let hidden = hidden_components(&raw.original_term, &canonical, &raw.hidden_components);
    let tags = risk_tags(&canonical, &hidden, &raw.risk_flags);

    NormalizedIngredient {
        original_term: raw.original_term.trim().to_string(),
        canonical_name: canonical,
        risk_tags: tags,
        hidden_components: hidden,
        explanation: raw.explanation.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskTag;
    use crate::pipeline::inference::{InferenceError, MockInferenceClient, MockReply};

    const MARKER: &str = "Indian Context Normalizer";

    fn normalizer(client: MockInferenceClient) -> Normalizer {
        Normalizer::new(Arc::new(client), "judge", 8_000)
    }

    #[test]
    fn hing_gets_wheat_even_when_delegate_forgets() {
        let reply = r#"{"normalized_ingredients":[
            {"original_term":"Hing","scientific_name":"Asafoetida","risk_flags":[],
             "hidden_components":[],"explanation":"Spice"},
            {"original_term":"Sugar","scientific_name":"Sucrose","risk_flags":["High Glycemic Index"],
             "hidden_components":[],"explanation":"Sugar"}]}"#;
        let set = normalizer(MockInferenceClient::new().on(MARKER, reply)).normalize("Hing, Sugar");

        assert_eq!(set.len(), 2);
        let hing = set.iter().next().unwrap();
        assert_eq!(hing.canonical_name, "Asafoetida");
        assert_eq!(hing.hidden_components, vec!["Wheat Flour".to_string()]);
        assert!(hing.has_tag(RiskTag::Gluten));

        let sugar = set.iter().nth(1).unwrap();
        assert!(sugar.has_tag(RiskTag::Glycemic));
    }

    #[test]
    fn label_order_is_preserved() {
        let reply = r#"{"normalized_ingredients":[{"original_term":"Salt"},{"original_term":"Maida"}]}"#;
        let set = normalizer(MockInferenceClient::new().on(MARKER, reply)).normalize("Salt, Maida");
        let terms: Vec<_> = set.iter().map(|i| i.original_term.as_str()).collect();
        assert_eq!(terms, vec!["Salt", "Maida"]);
    }

    #[test]
    fn delegate_failure_yields_empty_set() {
        let client = MockInferenceClient::new().on_reply(
            MARKER,
            MockReply::Fail(InferenceError::CapabilityUnavailable("down".into())),
        );
        assert!(normalizer(client).normalize("Sugar").is_empty());
    }

    #[test]
    fn malformed_reply_yields_empty_set() {
        let client = MockInferenceClient::new().on(MARKER, "Here are your ingredients: sugar");
        assert!(normalizer(client).normalize("Sugar").is_empty());
    }

    #[test]
    fn request_is_deterministic_json() {
        let client = Arc::new(
            MockInferenceClient::new().on(MARKER, r#"{"normalized_ingredients":[]}"#),
        );
        let normalizer = Normalizer::new(client.clone(), "judge", 8_000);
        normalizer.normalize("Sugar\u{200B}, Salt");

        let calls = client.recorded();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].expect_json);
        assert_eq!(calls[0].mode, crate::pipeline::inference::SamplingMode::Deterministic);
        assert_eq!(calls[0].payload, "INPUT TO ANALYZE: Sugar, Salt");
    }

    #[test]
    fn blank_text_skips_the_delegate() {
        let client = Arc::new(MockInferenceClient::new());
        let normalizer = Normalizer::new(client.clone(), "judge", 8_000);
        assert!(normalizer.normalize("\u{FEFF}\u{200B}").is_empty());
        assert_eq!(client.total_calls(), 0);
    }
}
