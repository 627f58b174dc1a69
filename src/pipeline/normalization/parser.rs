use serde::Deserialize;

use super::NormalizationError;
use crate::pipeline::inference::extract_json_object;

/// One ingredient exactly as the normalizer delegate described it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawNormalizedIngredient {
    pub original_term: String,
    #[serde(default)]
    pub scientific_name: String,
    #[serde(default)]
    pub risk_flags: Vec<String>,
    #[serde(default)]
    pub hidden_components: Vec<String>,
    #[serde(default)]
    pub explanation: String,
}

/// Parse the normalizer reply. The top-level key is required and every
/// item must name its original term; anything else is malformed.
pub fn parse_normalizer_response(
    response: &str,
) -> Result<Vec<RawNormalizedIngredient>, NormalizationError> {
    #[derive(Deserialize)]
    struct RawResponse {
        normalized_ingredients: Option<Vec<RawNormalizedIngredient>>,
    }

    let json_str = extract_json_object(response)
        .map_err(|e| NormalizationError::MalformedResponse(e.to_string()))?;

    let raw: RawResponse = serde_json::from_str(&json_str)
        .map_err(|e| NormalizationError::JsonParsing(e.to_string()))?;

    let items = raw.normalized_ingredients.ok_or_else(|| {
        NormalizationError::MalformedResponse("missing normalized_ingredients".into())
    })?;

    Ok(items
        .into_iter()
        .filter(|item| !item.original_term.trim().is_empty())
        .collect())
}
