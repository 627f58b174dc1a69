//! Text hygiene on both sides of an inference call.
//!
//! Inbound: strip model artifacts (thinking tags, unused tokens, code fences)
//! before a stage parses a reply. Outbound: strip invisible and control
//! characters from label text before it is embedded in a prompt.

use std::sync::LazyLock;

use regex::Regex;

use super::InferenceError;

/// Strip model-specific artifacts from raw output.
///
/// Handles:
/// 1. Gemma thinking blocks (`<unusedN>thought\n...`)
/// 2. Stray `<unusedN>` tokens
/// 3. Leading/trailing whitespace left by stripping
pub fn sanitize_llm_output(raw: &str) -> String {
    let mut text = raw.to_string();

    if let Some(idx) = text.find("<unused") {
        if let Some(thought_offset) = text[idx..].find("thought\n") {
            text = text[idx + thought_offset + 8..].to_string();
        }
    }

    static UNUSED_TOKEN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<unused\d+>").expect("valid regex"));
    text = UNUSED_TOKEN_RE.replace_all(&text, "").to_string();

    text.trim().to_string()
}

/// Locate the JSON object in a model reply.
///
/// Accepts a bare object, an object inside ```json fences, or an object
/// surrounded by stray prose. Fails when no `{...}` span exists.
pub fn extract_json_object(raw: &str) -> Result<String, InferenceError> {
    let cleaned = sanitize_llm_output(raw);

    let body = match cleaned.find("```") {
        Some(fence) => {
            let after = &cleaned[fence + 3..];
            let after = after.strip_prefix("json").unwrap_or(after);
            match after.find("```") {
                Some(end) => after[..end].trim(),
                None => after.trim(),
            }
        }
        None => cleaned.as_str(),
    };

    let start = body
        .find('{')
        .ok_or_else(|| InferenceError::MalformedOutput("No JSON object found".into()))?;
    let end = body
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| InferenceError::MalformedOutput("Unclosed JSON object".into()))?;

    Ok(body[start..=end].to_string())
}

/// Clean label text before it goes into a prompt: drop invisible and
/// control characters, collapse blank runs, cap the length on a char boundary.
pub fn sanitize_for_prompt(raw: &str, max_chars: usize) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| {
            if matches!(*c, ' ' | '\n' | '\t') {
                return true;
            }
            if matches!(
                *c,
                '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}'
            ) {
                return false;
            }
            !c.is_control()
        })
        .collect();

    let normalized = cleaned
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if normalized.chars().count() <= max_chars {
        return normalized;
    }

    tracing::warn!(
        max_chars,
        original_chars = normalized.chars().count(),
        "Ingredient text truncated before inference"
    );
    normalized.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_thinking_tags() {
        let raw = "<unused94>thought\nLet me look at the label...\nSugar, Salt";
        assert_eq!(
            sanitize_llm_output(raw),
            "Let me look at the label...\nSugar, Salt"
        );
    }

    #[test]
    fn strips_stray_unused_tokens() {
        assert_eq!(sanitize_llm_output("<unused3>Sugar<unused12>"), "Sugar");
    }

    #[test]
    fn json_in_fences_is_found() {
        let raw = "Here you go:\n```json\n{\"verdict\": \"SAFE\"}\n```\nthanks";
        assert_eq!(extract_json_object(raw).unwrap(), "{\"verdict\": \"SAFE\"}");
    }

    #[test]
    fn bare_json_with_prose_is_found() {
        let raw = "Result {\"a\": {\"b\": 1}} done";
        assert_eq!(extract_json_object(raw).unwrap(), "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn missing_json_is_malformed() {
        let err = extract_json_object("no structure here").unwrap_err();
        assert!(matches!(err, InferenceError::MalformedOutput(_)));
    }

    #[test]
    fn prompt_text_loses_invisible_and_control_chars() {
        let raw = "Sugar\u{200B}, Salt\u{0007}\n\n\n  Maida  ";
        assert_eq!(sanitize_for_prompt(raw, 100), "Sugar, Salt\nMaida");
    }

    #[test]
    fn prompt_text_is_capped_on_char_boundary() {
        let raw = "जीरा, हींग, नमक";
        let capped = sanitize_for_prompt(raw, 4);
        assert_eq!(capped.chars().count(), 4);
    }
}
