//! Decide what the user reads once the critic has spoken.

use crate::models::{CritiqueReport, DraftReport, ReviewOutcome, Severity};

/// The final message and what happened to the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDecision {
    pub final_message: String,
    pub outcome: ReviewOutcome,
}

/// Apply the override policy.
///
/// A non-empty revision replaces the draft verbatim. The one exception is an
/// UNSAFE draft: its revision is accepted only when the critic declares the
/// revision UNSAFE as well. A missing or lower declaration discards the
/// revision and reports why.
pub fn apply_review(draft: &DraftReport, critique: Option<&CritiqueReport>) -> ReviewDecision {
    let Some(critique) = critique else {
        return ReviewDecision {
            final_message: draft.text.clone(),
            outcome: ReviewOutcome::NotReviewed,
        };
    };

    let Some(revision) = critique.revision.as_deref() else {
        return ReviewDecision {
            final_message: draft.text.clone(),
            outcome: ReviewOutcome::DraftUpheld,
        };
    };

    if let Some(reason) = downgrade_reason(draft.severity, critique.revised_severity) {
        tracing::warn!(
            draft_severity = %draft.severity,
            revised_severity = ?critique.revised_severity,
            reason = %reason,
            "Critique revision rejected: it would weaken an UNSAFE verdict"
        );
        return ReviewDecision {
            final_message: draft.text.clone(),
            outcome: ReviewOutcome::RevisionRejected { reason },
        };
    }

    ReviewDecision {
        final_message: revision.to_string(),
        outcome: ReviewOutcome::Revised,
    }
}

fn downgrade_reason(draft_severity: Severity, revised_severity: Option<Severity>) -> Option<String> {
    if draft_severity != Severity::Unsafe {
        return None;
    }
    match revised_severity {
        Some(Severity::Unsafe) => None,
        Some(revised) => Some(format!("revision declared {revised} for an UNSAFE product")),
        None => Some("revision did not declare a severity for an UNSAFE product".to_string()),
    }
}
