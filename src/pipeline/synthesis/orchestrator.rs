use std::sync::Arc;
use std::time::Instant;

use super::prompt::{build_synthesis_payload, TRUST_INSTRUCTION};
use super::red_flag::{compose_draft, overall_severity};
use super::SynthesisError;
use crate::models::{ConditionProfile, DraftReport, DraftSource, VerdictMap};
use crate::pipeline::inference::{sanitize_llm_output, InferenceClient, InferenceRequest};

/// Merges verdicts into one draft under the Red-Flag rule.
pub struct Synthesizer {
    client: Arc<dyn InferenceClient>,
    model: String,
}

impl Synthesizer {
    pub fn new(client: Arc<dyn InferenceClient>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    /// Build the draft. Severity, headline and findings are structural;
    /// only the narrative between them comes from the prose capability.
    /// A failed narrative call leaves the structured draft.
    pub fn synthesize(&self, profile: &ConditionProfile, verdicts: &VerdictMap) -> DraftReport {
        let _span = tracing::info_span!("synthesize", verdicts = verdicts.len()).entered();
        let start = Instant::now();
        let severity = overall_severity(verdicts);

        match self.narrate(profile, verdicts) {
            Ok(narrative) => {
                tracing::info!(
                    severity = %severity,
                    elapsed_ms = %start.elapsed().as_millis(),
                    narrative_len = narrative.len(),
                    "Draft synthesized"
                );
                DraftReport {
                    text: compose_draft(severity, Some(&narrative), verdicts),
                    severity,
                    source: DraftSource::Generated,
                }
            }
            Err(e) => {
                tracing::warn!(
                    severity = %severity,
                    error = %e,
                    "Narrative unavailable, using structured draft"
                );
                structured_draft(verdicts)
            }
        }
    }

    fn narrate(
        &self,
        profile: &ConditionProfile,
        verdicts: &VerdictMap,
    ) -> Result<String, SynthesisError> {
        let request = InferenceRequest::new(
            &self.model,
            TRUST_INSTRUCTION,
            build_synthesis_payload(profile, overall_severity(verdicts), verdicts),
        )
        .creative();

        let narrative = sanitize_llm_output(&self.client.invoke(&request)?);
        if narrative.is_empty() {
            return Err(SynthesisError::EmptyNarrative);
        }
        Ok(narrative)
    }
}

/// Headline and findings only. Used when no narrative can be produced.
pub fn structured_draft(verdicts: &VerdictMap) -> DraftReport {
    let severity = overall_severity(verdicts);
    DraftReport {
        text: compose_draft(severity, None, verdicts),
        severity,
        source: DraftSource::StructuredFallback,
    }
}
