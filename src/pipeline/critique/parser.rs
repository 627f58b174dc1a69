use std::str::FromStr;

use serde::Deserialize;

use super::CritiqueError;
use crate::models::{CritiqueReport, Severity};
use crate::pipeline::inference::extract_json_object;

/// Parse the critic's reply. Accepts the alternate key names the critic
/// has been seen to use; a blank revision means the draft stands.
pub fn parse_critique_response(response: &str) -> Result<CritiqueReport, CritiqueError> {
    #[derive(Deserialize)]
    struct RawCritique {
        verdict_agreement: Option<bool>,
        #[serde(alias = "revision")]
        improved_response: Option<String>,
        #[serde(alias = "revised_verdict")]
        revised_severity: Option<String>,
        #[serde(alias = "critique")]
        notes: Option<String>,
    }

    let json_str = extract_json_object(response)
        .map_err(|e| CritiqueError::MalformedResponse(e.to_string()))?;
    let raw: RawCritique =
        serde_json::from_str(&json_str).map_err(|e| CritiqueError::JsonParsing(e.to_string()))?;

    let verdict_agreement = raw
        .verdict_agreement
        .ok_or_else(|| CritiqueError::MalformedResponse("missing verdict_agreement".into()))?;

    let revision = raw
        .improved_response
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    let revised_severity = raw.revised_severity.and_then(|s| {
        let parsed = Severity::from_str(s.trim().to_uppercase().as_str()).ok();
        if parsed.is_none() {
            tracing::debug!(value = %s, "Ignoring unrecognized revised severity");
        }
        parsed
    });

    Ok(CritiqueReport {
        verdict_agreement,
        revision,
        notes: raw.notes.unwrap_or_default().trim().to_string(),
        revised_severity,
    })
}
