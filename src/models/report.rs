use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Severity;
use super::ingredient::NormalizedIngredientSet;
use super::verdict::VerdictMap;

/// Where a draft's narrative came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftSource {
    /// Narrative written by the prose capability around the structured findings.
    Generated,
    /// Prose capability failed; headline and findings only.
    StructuredFallback,
}

/// Synthesized draft, before critique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftReport {
    pub text: String,
    /// Severity computed from the verdict mapping; the text was built under it.
    pub severity: Severity,
    pub source: DraftSource,
}

/// Second-pass review of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CritiqueReport {
    pub verdict_agreement: bool,
    /// Replacement message, trimmed of surrounding whitespace at parse time.
    /// When accepted it becomes the final message exactly as stored here.
    /// `None` means the draft stands unchanged.
    pub revision: Option<String>,
    pub notes: String,
    /// Severity the critic says its revision conveys. Required for a
    /// revision of an UNSAFE draft to be accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_severity: Option<Severity>,
}

/// What happened to the draft during review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReviewOutcome {
    /// No review ran (extraction failed, or the critique capability failed).
    NotReviewed,
    /// Critic offered no revision.
    DraftUpheld,
    /// Critic's revision became the final message.
    Revised,
    /// Critic's revision would have weakened an UNSAFE verdict and was discarded.
    RevisionRejected { reason: String },
}

/// Terminal artifact of one evaluation. Never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardianResult {
    pub request_id: Uuid,
    pub evaluated_at: DateTime<Utc>,
    pub final_message: String,
    pub severity: Severity,
    pub critique: Option<CritiqueReport>,
    pub review: ReviewOutcome,
    pub verdicts: VerdictMap,
    pub normalized: NormalizedIngredientSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_outcome_is_tagged() {
        let json = serde_json::to_value(ReviewOutcome::RevisionRejected {
            reason: "downgrade".into(),
        })
        .unwrap();
        assert_eq!(json["outcome"], "revision_rejected");
        assert_eq!(json["reason"], "downgrade");
    }

    #[test]
    fn critique_without_severity_claim_deserializes() {
        let report: CritiqueReport = serde_json::from_str(
            r#"{"verdict_agreement": true, "revision": null, "notes": "ok"}"#,
        )
        .unwrap();
        assert!(report.revision.is_none());
        assert!(report.revised_severity.is_none());
    }
}
