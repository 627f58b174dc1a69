//! Red-Flag rule and the structured findings every draft carries.
//!
//! Severity is computed here, once, from verdict data. Nothing downstream
//! re-derives it from prose.

use crate::models::{EvaluatorVerdict, Severity, Verdict, VerdictMap};
use crate::pipeline::specialists::label_for;

/// Overall characterization of a verdict mapping.
///
/// Any UNSAFE dominates. ERROR verdicts never count as findings: they
/// only downgrade an otherwise clean mapping to UNVERIFIED.
pub fn overall_severity(verdicts: &VerdictMap) -> Severity {
    let has = |v: Verdict| verdicts.values().any(|e| e.verdict == v);

    if has(Verdict::Unsafe) {
        Severity::Unsafe
    } else if has(Verdict::Risky) {
        Severity::Risky
    } else if verdicts.is_empty() || has(Verdict::Error) {
        Severity::Unverified
    } else {
        Severity::Safe
    }
}

/// One line attributing a verdict to its condition.
pub fn finding_line(verdict: &EvaluatorVerdict) -> String {
    let label = label_for(&verdict.capability_name);

    let mut line = match verdict.verdict {
        Verdict::Error => {
            return format!(
                "❔ Could not be verified for {label}: {}.",
                verdict.reasoning.trim_end_matches('.')
            )
        }
        Verdict::Unsafe => format!("🛑 UNSAFE for {label}."),
        Verdict::Risky => format!("⚠️ RISKY for {label}."),
        Verdict::Safe => format!("✅ SAFE for {label}."),
    };

    if !verdict.flagged_items.is_empty() {
        let items: Vec<&str> = verdict.flagged_items.iter().map(String::as_str).collect();
        line.push_str(&format!(" Flagged: {}.", items.join(", ")));
    }
    if !verdict.reasoning.trim().is_empty() {
        line.push(' ');
        line.push_str(verdict.reasoning.trim());
    }
    if let Some(advisory) = &verdict.advisory {
        line.push_str(&format!(" Note: {advisory}"));
    }
    line
}

/// Per-condition findings, one line per verdict, findings before checks
/// that could not run.
pub fn findings_block(verdicts: &VerdictMap) -> String {
    if verdicts.is_empty() {
        return "Findings by condition:\n- No safety checks could be run.".to_string();
    }

    let mut ordered: Vec<&EvaluatorVerdict> = verdicts.values().collect();
    ordered.sort_by_key(|v| rank(v.verdict));

    let lines: Vec<String> = ordered
        .into_iter()
        .map(|v| format!("- {}", finding_line(v)))
        .collect();
    format!("Findings by condition:\n{}", lines.join("\n"))
}

fn rank(verdict: Verdict) -> u8 {
    match verdict {
        Verdict::Unsafe => 0,
        Verdict::Risky => 1,
        Verdict::Safe => 2,
        Verdict::Error => 3,
    }
}

/// Assemble a draft: headline, optional narrative, findings.
pub fn compose_draft(
    severity: Severity,
    narrative: Option<&str>,
    verdicts: &VerdictMap,
) -> String {
    let mut parts = vec![severity.headline().to_string()];
    if let Some(text) = narrative.map(str::trim).filter(|t| !t.is_empty()) {
        parts.push(text.to_string());
    }
    parts.push(findings_block(verdicts));
    parts.join("\n\n")
}
