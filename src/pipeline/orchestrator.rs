//! Request lifecycle: classify → extract → normalize → dispatch →
//! synthesize → critique, under one end-to-end deadline.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::GuardianConfig;
use crate::models::{
    ConditionProfile, ExtractionResult, GuardianResult, InputKind, NormalizedIngredientSet,
    RawInput, ReviewOutcome, Severity, VerdictMap,
};
use crate::pipeline::critique::{apply_review, Critic};
use crate::pipeline::extraction::{classify, Extractor, PageFetcher};
use crate::pipeline::inference::InferenceClient;
use crate::pipeline::normalization::Normalizer;
use crate::pipeline::specialists::Dispatcher;
use crate::pipeline::synthesis::{structured_draft, Synthesizer};

/// A blocking stage that did not produce a value.
#[derive(Error, Debug)]
enum StageInterrupt {
    #[error("request deadline passed")]
    DeadlineExceeded,

    #[error("stage crashed: {0}")]
    Crashed(String),
}

/// Run a blocking stage on the blocking pool, bounded by `deadline`.
///
/// The current span is carried onto the blocking thread so stage logs stay
/// attached to the request.
async fn run_stage<T, F>(
    stage: &'static str,
    deadline: Instant,
    f: F,
) -> Result<T, StageInterrupt>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let span = tracing::Span::current();
    let task = tokio::task::spawn_blocking(move || span.in_scope(f));
    match tokio::time::timeout_at(deadline, task).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(join_err)) => {
            tracing::error!(stage, error = %join_err, "Stage task panicked");
            Err(StageInterrupt::Crashed(join_err.to_string()))
        }
        Err(_) => {
            tracing::warn!(stage, "Stage cut off by request deadline");
            Err(StageInterrupt::DeadlineExceeded)
        }
    }
}

/// The guardian pipeline. Holds no per-request state; one instance serves
/// any number of concurrent requests.
pub struct Guardian {
    extractor: Arc<Extractor>,
    normalizer: Arc<Normalizer>,
    dispatcher: Dispatcher,
    synthesizer: Arc<Synthesizer>,
    critic: Arc<Critic>,
    request_timeout: Duration,
}

impl Guardian {
    /// Wire every stage to the injected capabilities.
    pub fn new(
        client: Arc<dyn InferenceClient>,
        fetcher: Arc<dyn PageFetcher>,
        config: &GuardianConfig,
    ) -> Self {
        Self {
            extractor: Arc::new(Extractor::new(
                Arc::clone(&client),
                fetcher,
                &config.vision_model,
                &config.judgment_model,
            )),
            normalizer: Arc::new(Normalizer::new(
                Arc::clone(&client),
                &config.judgment_model,
                config.max_ingredient_chars,
            )),
            dispatcher: Dispatcher::with_default_capabilities(
                Arc::clone(&client),
                &config.judgment_model,
                config.evaluator_timeout(),
            ),
            synthesizer: Arc::new(Synthesizer::new(Arc::clone(&client), &config.prose_model)),
            critic: Arc::new(Critic::new(client, &config.judgment_model)),
            request_timeout: config.request_timeout(),
        }
    }

    /// Replace the evaluator fan-out (custom registries, test fakes).
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Evaluate one product for one profile. Always returns a renderable result.
    pub async fn evaluate(&self, raw: RawInput, profile: &ConditionProfile) -> GuardianResult {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("guardian", request_id = %request_id);
        self.run(request_id, raw, profile).instrument(span).await
    }

    async fn run(
        &self,
        request_id: Uuid,
        raw: RawInput,
        profile: &ConditionProfile,
    ) -> GuardianResult {
        let started = Instant::now();
        let deadline = started + self.request_timeout;
        let profile = Arc::new(profile.clone());

        let classified = classify(&raw);
        drop(raw);
        tracing::info!(
            kind = %classified.kind(),
            conditions = %profile.describe(),
            "Evaluation started"
        );

        // Extraction is the only fail-fast stage.
        let kind = classified.kind();
        let extractor = Arc::clone(&self.extractor);
        let extraction = run_stage("extract", deadline, move || extractor.extract(&classified))
            .await
            .unwrap_or_else(|e| ExtractionResult::Failed(interrupt_reason(&e)));

        let text = match extraction {
            ExtractionResult::Text(text) => text,
            ExtractionResult::Failed(reason) => {
                tracing::warn!(reason = %reason, "Extraction failed, skipping evaluation");
                return GuardianResult {
                    request_id,
                    evaluated_at: Utc::now(),
                    final_message: extraction_failure_message(kind, &reason),
                    severity: Severity::Unverified,
                    critique: None,
                    review: ReviewOutcome::NotReviewed,
                    verdicts: VerdictMap::new(),
                    normalized: NormalizedIngredientSet::empty(),
                };
            }
        };

        let normalizer = Arc::clone(&self.normalizer);
        let normalized = run_stage("normalize", deadline, move || normalizer.normalize(&text))
            .await
            .unwrap_or_else(|_| NormalizedIngredientSet::empty());
        let normalized = Arc::new(normalized);

        let verdicts = Arc::new(
            self.dispatcher
                .dispatch(Arc::clone(&normalized), &profile, deadline)
                .await,
        );

        let synthesizer = Arc::clone(&self.synthesizer);
        let (p, v) = (Arc::clone(&profile), Arc::clone(&verdicts));
        let draft = run_stage("synthesize", deadline, move || synthesizer.synthesize(&p, &v))
            .await
            .unwrap_or_else(|_| structured_draft(&verdicts));

        let critic = Arc::clone(&self.critic);
        let (p, n, d) = (Arc::clone(&profile), Arc::clone(&normalized), draft.clone());
        let reviewed = run_stage("critique", deadline, move || critic.critique(&p, &n, &d)).await;
        let critique = match reviewed {
            Ok(Ok(report)) => Some(report),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Critique failed, draft stands");
                None
            }
            Err(_) => None,
        };

        let decision = apply_review(&draft, critique.as_ref());

        tracing::info!(
            severity = %draft.severity,
            verdicts = verdicts.len(),
            review = ?decision.outcome,
            elapsed_ms = %started.elapsed().as_millis(),
            "Evaluation complete"
        );

        GuardianResult {
            request_id,
            evaluated_at: Utc::now(),
            final_message: decision.final_message,
            severity: draft.severity,
            critique,
            review: decision.outcome,
            verdicts: Arc::unwrap_or_clone(verdicts),
            normalized: Arc::unwrap_or_clone(normalized),
        }
    }
}

fn interrupt_reason(interrupt: &StageInterrupt) -> String {
    match interrupt {
        StageInterrupt::DeadlineExceeded => "reading the label took too long".to_string(),
        StageInterrupt::Crashed(_) => "the label reader stopped unexpectedly".to_string(),
    }
}

/// User-facing message for a failed extraction, with a retry instruction
/// that fits the kind of input.
pub fn extraction_failure_message(kind: InputKind, reason: &str) -> String {
    let retry = match kind {
        InputKind::ImagePayload => {
            "Please try again with a clearer, well-lit photo of the ingredients panel, \
             or type the ingredients in manually."
        }
        InputKind::WebLink => {
            "Please check the link and try again, or paste the ingredient list as text."
        }
        InputKind::FreeText => "Please try again by typing or pasting the ingredient list.",
    };
    format!(
        "We couldn't read the ingredient list: {}. {retry}",
        reason.trim().trim_end_matches('.')
    )
}
