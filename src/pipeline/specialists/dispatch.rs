use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::Instrument;

use super::evaluator::{default_evaluators, Evaluator};
use super::EvaluatorError;
use crate::models::{ConditionProfile, EvaluatorVerdict, NormalizedIngredientSet, VerdictMap};
use crate::pipeline::inference::InferenceClient;

/// Fans a normalized ingredient set out to the evaluators a profile activates.
pub struct Dispatcher {
    evaluators: Vec<Arc<dyn Evaluator>>,
    evaluator_timeout: Duration,
}

impl Dispatcher {
    pub fn new(evaluators: Vec<Arc<dyn Evaluator>>, evaluator_timeout: Duration) -> Self {
        Self {
            evaluators,
            evaluator_timeout,
        }
    }

    /// Dispatcher over the default capability registry.
    pub fn with_default_capabilities(
        client: Arc<dyn InferenceClient>,
        model: &str,
        evaluator_timeout: Duration,
    ) -> Self {
        Self::new(default_evaluators(client, model), evaluator_timeout)
    }

    /// Evaluators the profile activates, in registration order.
    pub fn select(&self, profile: &ConditionProfile) -> Vec<Arc<dyn Evaluator>> {
        self.evaluators
            .iter()
            .filter(|e| e.spec().activated_by(profile))
            .cloned()
            .collect()
    }

    /// Run every selected evaluator concurrently and join them.
    ///
    /// The returned mapping has exactly one entry per selected capability.
    /// Errors, panics, malformed replies and per-evaluator timeouts become
    /// that capability's ERROR verdict. If `deadline` passes during the
    /// join, finished verdicts are kept and the rest become ERROR.
    pub async fn dispatch(
        &self,
        ingredients: Arc<NormalizedIngredientSet>,
        profile: &ConditionProfile,
        deadline: Instant,
    ) -> VerdictMap {
        let selected = self.select(profile);
        tracing::info!(
            capabilities = ?selected.iter().map(|e| e.spec().capability_name).collect::<Vec<_>>(),
            ingredients = ingredients.len(),
            "Dispatching evaluators"
        );

        let mut tasks = JoinSet::new();
        for evaluator in &selected {
            let evaluator = Arc::clone(evaluator);
            let ingredients = Arc::clone(&ingredients);
            let timeout = self.evaluator_timeout;
            tasks.spawn(run_isolated(evaluator, ingredients, timeout).in_current_span());
        }

        let mut verdicts = VerdictMap::new();
        let mut deadline_hit = false;
        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok(verdict))) => {
                    verdicts.insert(verdict.capability_name.clone(), verdict);
                }
                Ok(Some(Err(e))) => {
                    tracing::error!(error = %e, "Evaluator task failed to join");
                }
                Ok(None) => break,
                Err(_) => {
                    deadline_hit = true;
                    tasks.abort_all();
                    break;
                }
            }
        }

        for evaluator in &selected {
            let name = evaluator.spec().capability_name;
            verdicts.entry(name.to_string()).or_insert_with(|| {
                let cause = if deadline_hit {
                    "did not finish before the request deadline"
                } else {
                    "evaluation task was lost"
                };
                tracing::warn!(capability = name, cause, "Recording ERROR verdict");
                EvaluatorVerdict::error(name, cause)
            });
        }

        tracing::info!(
            verdicts = verdicts.len(),
            errors = verdicts.values().filter(|v| !v.verdict.is_finding()).count(),
            deadline_hit,
            "Evaluators joined"
        );
        verdicts
    }
}

/// Run one evaluator on the blocking pool under its own timeout.
///
/// Never fails: every outcome is folded into a verdict named after the
/// capability. A timed-out call keeps its blocking thread until the
/// underlying HTTP timeout fires; its result is discarded.
async fn run_isolated(
    evaluator: Arc<dyn Evaluator>,
    ingredients: Arc<NormalizedIngredientSet>,
    timeout: Duration,
) -> EvaluatorVerdict {
    let name = evaluator.spec().capability_name;
    let start = std::time::Instant::now();

    let span = tracing::Span::current();
    let handle =
        tokio::task::spawn_blocking(move || span.in_scope(|| evaluator.evaluate(&ingredients)));

    let outcome = match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(EvaluatorError::Panicked(join_err.to_string())),
        Err(_) => Err(EvaluatorError::TimedOut(timeout.as_millis())),
    };

    match outcome {
        Ok(mut verdict) => {
            // The mapping key is the registered name, whatever the evaluator wrote.
            verdict.capability_name = name.to_string();
            tracing::info!(
                capability = name,
                verdict = %verdict.verdict,
                flagged = verdict.flagged_items.len(),
                elapsed_ms = %start.elapsed().as_millis(),
                "Evaluator finished"
            );
            verdict
        }
        Err(e) => {
            tracing::warn!(
                capability = name,
                error = %e,
                elapsed_ms = %start.elapsed().as_millis(),
                "Evaluator failed"
            );
            EvaluatorVerdict::error(name, e.to_string())
        }
    }
}
