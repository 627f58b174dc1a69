use std::sync::Arc;
use std::time::Instant;

use super::parser::parse_critique_response;
use super::prompt::{build_critique_payload, CRITIQUE_INSTRUCTION};
use super::CritiqueError;
use crate::models::{ConditionProfile, CritiqueReport, DraftReport, NormalizedIngredientSet};
use crate::pipeline::inference::{InferenceClient, InferenceRequest};

/// Independent second-pass reviewer of a synthesized draft.
pub struct Critic {
    client: Arc<dyn InferenceClient>,
    model: String,
}

impl Critic {
    pub fn new(client: Arc<dyn InferenceClient>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    /// Review the draft against the normalized data and profile.
    pub fn critique(
        &self,
        profile: &ConditionProfile,
        ingredients: &NormalizedIngredientSet,
        draft: &DraftReport,
    ) -> Result<CritiqueReport, CritiqueError> {
        let _span = tracing::info_span!("critique", draft_severity = %draft.severity).entered();
        let start = Instant::now();

        let request = InferenceRequest::new(
            &self.model,
            CRITIQUE_INSTRUCTION,
            build_critique_payload(profile, ingredients, draft),
        )
        .deterministic()
        .json();

        let reply = self.client.invoke(&request)?;
        let report = parse_critique_response(&reply)?;

        tracing::info!(
            agreement = report.verdict_agreement,
            revised = report.revision.is_some(),
            elapsed_ms = %start.elapsed().as_millis(),
            "Critique complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DraftSource, Severity};
    use crate::pipeline::inference::MockInferenceClient;

    fn draft() -> DraftReport {
        DraftReport {
            text: "🛑 UNSAFE for your health profile.".into(),
            severity: Severity::Unsafe,
            source: DraftSource::Generated,
        }
    }

    #[test]
    fn critic_returns_parsed_report() {
        let client = Arc::new(MockInferenceClient::new().on(
            "Critique Agent",
            r#"{"verdict_agreement":true,"improved_response":null,"notes":"Grounded."}"#,
        ));
        let critic = Critic::new(client.clone(), "judge");
        let report = critic
            .critique(&ConditionProfile::default(), &NormalizedIngredientSet::empty(), &draft())
            .unwrap();

        assert!(report.verdict_agreement);
        assert!(report.revision.is_none());
        assert!(client.recorded()[0].expect_json);
    }

    #[test]
    fn capability_failure_is_an_error() {
        let critic = Critic::new(Arc::new(MockInferenceClient::new()), "judge");
        let result =
            critic.critique(&ConditionProfile::default(), &NormalizedIngredientSet::empty(), &draft());
        assert!(matches!(result, Err(CritiqueError::Inference(_))));
    }
}
