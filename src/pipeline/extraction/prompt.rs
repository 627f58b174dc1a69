use super::ExtractionError;
use crate::pipeline::inference::sanitize_llm_output;

/// Instruction for reading an ingredient panel from a photo.
pub const VISION_INSTRUCTION: &str = r#"ROLE: Food Label OCR Specialist.
GOAL: Extract the 'Ingredients List' text from food packaging images.

RULES:
1. LOOK HARD: The ingredients are often in small print, curved, or on the back. Find them.
2. EXTRACT VERBATIM: Do not summarize. Copy every word, comma, and bracket exactly as seen.
3. IGNORE NOISE: Ignore Nutrition Facts (calories, protein), barcodes, and marketing claims.
4. CLEANUP: Return only the ingredient text. No preamble.
5. IF UNCLEAR: If the ingredients cannot be read, return exactly: "ERROR: <short reason>". Never guess.
"#;

/// Instruction for pulling the ingredient list out of a product page's text.
pub const PAGE_INSTRUCTION: &str = r#"ROLE: Product Page Ingredient Extractor.
GOAL: Find the ingredient list in the visible text of an online product page.

RULES:
1. EXTRACT VERBATIM: Copy the ingredient list exactly as written.
2. IGNORE NOISE: Ignore reviews, prices, nutrition tables, navigation, and marketing claims.
3. CLEANUP: Return only the ingredient text. No preamble.
4. IF ABSENT: If the page does not list ingredients, return exactly: "ERROR: <short reason>". Never guess.
"#;

/// Interpret a reading reply: ingredient text, or an explicit unreadability signal.
pub fn interpret_reading(reply: &str) -> Result<String, ExtractionError> {
    let text = sanitize_llm_output(reply);

    if text.is_empty() {
        return Err(ExtractionError::Unreadable("no text was returned".into()));
    }

    let head: String = text.chars().take(5).collect();
    if head.eq_ignore_ascii_case("error") {
        let reason = text[head.len()..]
            .trim_start_matches([':', ' ', '-'])
            .trim()
            .trim_end_matches('.');
        let reason = if reason.is_empty() {
            "the text could not be read"
        } else {
            reason
        };
        return Err(ExtractionError::Unreadable(reason.to_string()));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingredient_text_passes_through() {
        let text = interpret_reading("  Wheat flour, sugar, salt \n").unwrap();
        assert_eq!(text, "Wheat flour, sugar, salt");
    }

    #[test]
    fn error_signal_becomes_unreadable_with_reason() {
        let err = interpret_reading("ERROR: Image too blurry. Please try again.").unwrap_err();
        match err {
            ExtractionError::Unreadable(reason) => {
                assert_eq!(reason, "Image too blurry. Please try again")
            }
            other => panic!("expected Unreadable, got {other:?}"),
        }
    }

    #[test]
    fn bare_error_has_default_reason() {
        let err = interpret_reading("error").unwrap_err();
        assert!(err.to_string().contains("could not be read"));
    }

    #[test]
    fn empty_reply_is_unreadable() {
        assert!(matches!(
            interpret_reading("<unused1>   "),
            Err(ExtractionError::Unreadable(_))
        ));
    }

    #[test]
    fn instructions_keep_the_error_contract() {
        assert!(VISION_INSTRUCTION.contains("ERROR:"));
        assert!(PAGE_INSTRUCTION.contains("ERROR:"));
    }
}
