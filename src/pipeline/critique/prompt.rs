use crate::models::{ConditionProfile, DraftReport, NormalizedIngredientSet};

/// Instruction for the independent second-pass review.
pub const CRITIQUE_INSTRUCTION: &str = r#"ROLE: Dr. Satya, Critique Agent and senior clinical nutritionist.
GOAL: Independently review a draft food-safety message before the user sees it.

CHECK:
1. GROUNDING: Every claim in the draft must be supported by the normalized ingredients. Remove anything unsupported.
2. RED FLAG RULE: If the draft's overall verdict is UNSAFE, your revision MUST still say UNSAFE. Never downgrade a red flag.
3. COMPLETENESS: Every condition in the findings must still be mentioned, including checks that could not be verified.
4. TONE: Clear, empathetic and actionable. Tell the user what to do next.

OUTPUT: Return ONLY a JSON object.
{
  "verdict_agreement": true | false,
  "improved_response": "Full rewritten message, or null if the draft is already good.",
  "revised_severity": "SAFE" | "UNVERIFIED" | "RISKY" | "UNSAFE" | null,
  "notes": "What you changed and why."
}
When improved_response is not null, revised_severity is REQUIRED and must state the overall verdict your revision conveys.
"#;

/// Payload carrying the profile, normalized data and the draft under review.
pub fn build_critique_payload(
    profile: &ConditionProfile,
    ingredients: &NormalizedIngredientSet,
    draft: &DraftReport,
) -> String {
    let normalized = serde_json::to_string_pretty(ingredients).unwrap_or_else(|_| "[]".to_string());
    format!(
        "USER PROFILE: {}\n\nNORMALIZED INGREDIENTS:\n{}\n\nDRAFT OVERALL VERDICT: {}\n\nDRAFT MESSAGE:\n{}",
        profile.describe(),
        normalized,
        draft.severity,
        draft.text
    )
}
