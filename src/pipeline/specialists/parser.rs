use std::collections::BTreeSet;

use serde_json::Value;

use super::EvaluatorError;
use crate::models::{EvaluatorVerdict, Verdict};
use crate::pipeline::inference::extract_json_object;

/// Keys an evaluator may use for the items behind its verdict.
const ITEM_KEYS: &[&str] = &[
    "flagged_items",
    "flagged_ingredients",
    "risky_ingredients",
    "detected_allergens",
    "bad_additives",
];

const REASONING_KEYS: &[&str] = &["reasoning", "health_impact"];

const ADVISORY_KEYS: &[&str] = &["advisory", "consumer_message", "contamination_warning"];

/// Map an evaluator's verdict word onto the fixed vocabulary.
///
/// ERROR is never accepted from a delegate: an evaluator that cannot judge
/// is a failed call, not a verdict.
pub fn parse_verdict_word(word: &str) -> Option<Verdict> {
    let normalized = word.trim().to_uppercase().replace([' ', '-'], "_");
    match normalized.as_str() {
        "SAFE" | "CLEAN_LABEL" => Some(Verdict::Safe),
        "UNSAFE" => Some(Verdict::Unsafe),
        "RISKY" | "RISKY_NEEDS_VERIFICATION" | "MODERATE_RISK" | "HIGHLY_PROCESSED" => {
            Some(Verdict::Risky)
        }
        _ => None,
    }
}

/// Parse one evaluator reply into a verdict keyed by `capability_name`.
pub fn parse_evaluator_response(
    capability_name: &str,
    response: &str,
) -> Result<EvaluatorVerdict, EvaluatorError> {
    let json_str = extract_json_object(response)
        .map_err(|e| EvaluatorError::MalformedOutput(e.to_string()))?;
    let value: Value = serde_json::from_str(&json_str)
        .map_err(|e| EvaluatorError::MalformedOutput(e.to_string()))?;
    let obj = value
        .as_object()
        .ok_or_else(|| EvaluatorError::MalformedOutput("verdict is not a JSON object".into()))?;

    let word = obj
        .get("verdict")
        .and_then(Value::as_str)
        .ok_or_else(|| EvaluatorError::MalformedOutput("missing verdict".into()))?;

    let reasoning = first_string(obj, REASONING_KEYS).unwrap_or_default();

    let verdict = parse_verdict_word(word).ok_or_else(|| {
        if word.trim().eq_ignore_ascii_case("error") {
            EvaluatorError::MalformedOutput(format!("evaluator reported an error: {reasoning}"))
        } else {
            EvaluatorError::MalformedOutput(format!("unknown verdict '{word}'"))
        }
    })?;

    let flagged_items = match ITEM_KEYS.iter().find_map(|key| obj.get(*key)) {
        None | Some(Value::Null) => BTreeSet::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Some(other) => {
            return Err(EvaluatorError::MalformedOutput(format!(
                "flagged items must be a list, got {other}"
            )))
        }
    };

    Ok(EvaluatorVerdict {
        capability_name: capability_name.to_string(),
        verdict,
        flagged_items,
        reasoning,
        advisory: first_string(obj, ADVISORY_KEYS),
    })
}

/// First non-blank string among `keys`.
fn first_string(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_shape_parses() {
        let v = parse_evaluator_response(
            "celiac",
            r#"{"verdict":"UNSAFE","flagged_items":["Malt","Oats"],"reasoning":"Barley malt.","advisory":"Avoid."}"#,
        )
        .unwrap();
        assert_eq!(v.capability_name, "celiac");
        assert_eq!(v.verdict, Verdict::Unsafe);
        assert_eq!(v.flagged_items.len(), 2);
        assert_eq!(v.advisory.as_deref(), Some("Avoid."));
    }

    #[test]
    fn specialist_vocabularies_are_mapped() {
        assert_eq!(parse_verdict_word("RISKY_NEEDS_VERIFICATION"), Some(Verdict::Risky));
        assert_eq!(parse_verdict_word("moderate risk"), Some(Verdict::Risky));
        assert_eq!(parse_verdict_word("HIGHLY_PROCESSED"), Some(Verdict::Risky));
        assert_eq!(parse_verdict_word("clean-label"), Some(Verdict::Safe));
        assert_eq!(parse_verdict_word("maybe"), None);
        assert_eq!(parse_verdict_word("ERROR"), None);
    }

    #[test]
    fn legacy_item_and_reasoning_keys() {
        let v = parse_evaluator_response(
            "additive",
            r#"{"verdict":"HIGHLY_PROCESSED","bad_additives":["Palm Oil","E621"],"health_impact":"Inflammatory fats."}"#,
        )
        .unwrap();
        assert_eq!(v.verdict, Verdict::Risky);
        assert!(v.flagged_items.contains("E621"));
        assert_eq!(v.reasoning, "Inflammatory fats.");
        assert!(v.advisory.is_none());

        let v = parse_evaluator_response(
            "allergen",
            r#"{"verdict":"UNSAFE","detected_allergens":["Milk"],"reasoning":"Whey.","contamination_warning":"Shared facility."}"#,
        )
        .unwrap();
        assert_eq!(v.advisory.as_deref(), Some("Shared facility."));
    }

    #[test]
    fn unknown_verdict_is_malformed() {
        let err = parse_evaluator_response("celiac", r#"{"verdict":"PROBABLY_FINE"}"#).unwrap_err();
        assert!(err.to_string().contains("PROBABLY_FINE"));
    }

    #[test]
    fn self_reported_error_is_malformed() {
        let err = parse_evaluator_response("celiac", r#"{"verdict":"ERROR","reasoning":"quota"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("quota"));
    }

    #[test]
    fn missing_verdict_is_malformed() {
        assert!(parse_evaluator_response("celiac", r#"{"flagged_items":[]}"#).is_err());
        assert!(parse_evaluator_response("celiac", "SAFE").is_err());
    }

    #[test]
    fn non_list_items_are_malformed() {
        let err =
            parse_evaluator_response("celiac", r#"{"verdict":"UNSAFE","flagged_items":"Malt"}"#)
                .unwrap_err();
        assert!(matches!(err, EvaluatorError::MalformedOutput(_)));
    }

    #[test]
    fn null_items_are_empty() {
        let v = parse_evaluator_response("metabolic", r#"{"verdict":"SAFE","risky_ingredients":null}"#)
            .unwrap();
        assert!(v.flagged_items.is_empty());
        assert_eq!(v.reasoning, "");
    }
}
