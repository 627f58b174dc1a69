use crate::models::{ConditionProfile, Severity, VerdictMap};

/// Instruction for the consumer-facing narrative.
pub const TRUST_INSTRUCTION: &str = r#"ROLE: Trust Agent for Satya-Health.
GOAL: Turn technical findings from several specialist agents into one CLEAR, EMPATHETIC and ACTIONABLE message for the user.

LOGIC (Hierarchy of Safety):
1. RED FLAG RULE: The overall verdict is already decided and given to you. Never soften or contradict it. If it is UNSAFE, say so plainly.
2. CONFLICTS: When specialists disagree, state both outcomes with their condition, e.g. "This is safe for your celiac disease, BUT it is risky for your diabetes."
3. UNVERIFIED CHECKS: A specialist with verdict ERROR could not check the product. Say that condition could not be verified. Never call it safe.
4. TONE: A helpful, knowledgeable friend, not a robot. Use emojis for visual cues (🛑, ⚠️, ✅).

OUTPUT: Plain text only, at most two short paragraphs. No JSON, no headings, no list of findings (it is appended for you).
"#;

/// Payload for the narrative call.
pub fn build_synthesis_payload(
    profile: &ConditionProfile,
    severity: Severity,
    verdicts: &VerdictMap,
) -> String {
    let findings = serde_json::to_string_pretty(verdicts).unwrap_or_else(|_| "{}".to_string());
    format!(
        "USER PROFILE: {}\nOVERALL VERDICT: {}\n\nFINDINGS FROM SPECIALISTS:\n{}\n\nTASK: Write the final response for this user.",
        profile.describe(),
        severity,
        findings
    )
}
