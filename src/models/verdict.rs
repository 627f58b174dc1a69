use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::enums::Verdict;

/// One evaluator capability's judgment over the normalized ingredient set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorVerdict {
    pub capability_name: String,
    pub verdict: Verdict,
    pub flagged_items: BTreeSet<String>,
    pub reasoning: String,
    /// Short consumer-facing caution the evaluator attached, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

impl EvaluatorVerdict {
    /// An ERROR verdict. Carries the cause so the report can say why a
    /// condition could not be verified.
    pub fn error(capability_name: &str, cause: impl Into<String>) -> Self {
        Self {
            capability_name: capability_name.to_string(),
            verdict: Verdict::Error,
            flagged_items: BTreeSet::new(),
            reasoning: cause.into(),
            advisory: None,
        }
    }
}

/// Verdicts keyed by capability name. Keys are unique and iteration order
/// never depends on the order evaluators finished in.
pub type VerdictMap = BTreeMap<String, EvaluatorVerdict>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_verdict_has_no_findings() {
        let v = EvaluatorVerdict::error("celiac", "timed out after 30s");
        assert_eq!(v.verdict, Verdict::Error);
        assert!(v.flagged_items.is_empty());
        assert_eq!(v.reasoning, "timed out after 30s");
    }

    #[test]
    fn advisory_is_omitted_when_absent() {
        let v = EvaluatorVerdict::error("additive", "x");
        let json = serde_json::to_value(&v).unwrap();
        assert!(json.get("advisory").is_none());
    }
}
