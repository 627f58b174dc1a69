/// Fixed instruction for the normalizer. Label text travels in the payload.
pub const NORMALIZER_INSTRUCTION: &str = r#"ROLE: Indian Context Normalizer, a senior Food Safety Scientist specializing in Indian retail products.
GOAL: Convert a messy, regional or marketing-heavy ingredient list into a strict scientific safety object.

INPUT: text that may contain regional Hindi/Indian terms (Maida, Besan, Khand), ambiguous categories ("Edible Vegetable Oil") and E-codes (E621).

TASKS:
1. NORMALIZE: Convert every regional term to its specific English scientific name.
   - "Maida" -> "Refined Wheat Flour"
   - "Rava/Sooji" -> "Semolina (Wheat)"
   - "Hing" -> "Asafoetida"
   - "Sendha Namak" -> "Rock Salt"
2. EXPAND HIDDEN INGREDIENTS (CRITICAL):
   - "Hing" or "Asafoetida": list "Wheat Flour" as a hidden component unless the input explicitly says "Gluten Free Hing".
   - "Margarine": add "Vegetable Fat" and "Milk Solids".
   - "Soy Sauce": add "Wheat" and "Soy".
3. ASSESS RISK FLAGS using only these words: glycemic, inflammatory, gluten, dairy, soy, nut, sodium.
   - glycemic for sugars and starches.
   - inflammatory for processed oils (palm, cottonseed, hydrogenated fats).
   - gluten, dairy, soy, nut for allergen sources; sodium for salt and sodium additives.

OUTPUT: Return ONLY a JSON object. No commentary.
{
  "normalized_ingredients": [
    {
      "original_term": "String",
      "scientific_name": "String",
      "risk_flags": ["String"],
      "hidden_components": ["String"],
      "explanation": "Short reason for the flags"
    }
  ]
}
"#;

/// Wrap sanitized label text as the normalizer payload.
pub fn build_normalizer_payload(ingredient_text: &str) -> String {
    format!("INPUT TO ANALYZE: {ingredient_text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_names_every_risk_tag() {
        for tag in crate::models::RiskTag::all() {
            assert!(NORMALIZER_INSTRUCTION.contains(tag.as_str()), "{tag}");
        }
    }

    #[test]
    fn payload_carries_text() {
        assert_eq!(build_normalizer_payload("Maida"), "INPUT TO ANALYZE: Maida");
    }
}
