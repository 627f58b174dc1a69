//! Deterministic normalization policy.
//!
//! The delegate's reply is never trusted on its own: regional names are
//! canonicalized from a fixed table, known composites are expanded, and
//! risk tags are recomputed from the fixed taxonomy.

use std::collections::BTreeSet;

use crate::models::RiskTag;

/// Regional or informal name → canonical name.
const CANONICAL_NAMES: &[(&str, &str)] = &[
    ("maida", "Refined Wheat Flour"),
    ("rava", "Semolina (Wheat)"),
    ("sooji", "Semolina (Wheat)"),
    ("suji", "Semolina (Wheat)"),
    ("hing", "Asafoetida"),
    ("sendha namak", "Rock Salt"),
    ("besan", "Chickpea Flour"),
    ("atta", "Whole Wheat Flour"),
    ("khand", "Unrefined Cane Sugar"),
    ("gur", "Jaggery"),
    ("dalda", "Hydrogenated Vegetable Fat"),
    ("vanaspati", "Hydrogenated Vegetable Fat"),
    ("palmolein", "Palm Oil"),
];

/// A composite ingredient and the sub-components it implies.
struct Composite {
    triggers: &'static [&'static str],
    implies: &'static [&'static str],
    /// Marking on the label that cancels the expansion.
    unless: &'static [&'static str],
}

const COMPOSITES: &[Composite] = &[
    Composite {
        triggers: &["hing", "asafoetida"],
        implies: &["Wheat Flour"],
        unless: &["gluten free"],
    },
    Composite {
        triggers: &["margarine"],
        implies: &["Vegetable Fat", "Milk Solids"],
        unless: &[],
    },
    Composite {
        triggers: &["soy sauce", "soya sauce"],
        implies: &["Wheat", "Soy"],
        unless: &[],
    },
];

/// Keyword phrases that put an ingredient in a risk class.
const TAG_KEYWORDS: &[(RiskTag, &[&str])] = &[
    (
        RiskTag::Gluten,
        &[
            "wheat", "barley", "rye", "malt", "malted", "semolina", "maida", "atta", "rava",
            "sooji", "suji", "spelt", "triticale", "kamut", "farro", "seitan",
        ],
    ),
    (
        RiskTag::Glycemic,
        &[
            "sugar", "sucrose", "maltodextrin", "dextrose", "glucose", "fructose", "jaggery",
            "gur", "khand", "honey", "syrup", "starch", "refined wheat flour", "maida",
            "rice flour",
        ],
    ),
    (
        RiskTag::Inflammatory,
        &[
            "palm", "palmolein", "cottonseed", "hydrogenated", "soybean oil", "vanaspati",
            "dalda",
        ],
    ),
    (
        RiskTag::Dairy,
        &[
            "milk", "whey", "casein", "caseinate", "lactose", "cheese", "butter", "ghee",
            "cream", "curd", "paneer", "yogurt", "yoghurt",
        ],
    ),
    (RiskTag::Soy, &["soy", "soya", "soybean", "lecithin"]),
    (
        RiskTag::Nut,
        &[
            "peanut", "peanuts", "groundnut", "groundnuts", "cashew", "cashews", "almond",
            "almonds", "walnut", "walnuts", "pistachio", "pistachios", "hazelnut", "hazelnuts",
            "marzipan", "praline",
        ],
    ),
    (RiskTag::Sodium, &["salt", "sodium", "msg", "e621", "namak"]),
];

/// Lower-cased alphanumeric tokens. "Gluten-Free" → ["gluten", "free"].
fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Whole-token phrase match, so "gur" never matches "yogurt".
fn contains_phrase(haystack: &[String], phrase: &str) -> bool {
    let needle = tokens(phrase);
    !needle.is_empty()
        && haystack
            .windows(needle.len())
            .any(|window| window == needle.as_slice())
}

/// Canonical name for a label term.
///
/// The fixed table wins over the delegate; otherwise the delegate's
/// scientific name, falling back to the term as printed.
pub fn canonical_name(original_term: &str, delegate_name: &str) -> String {
    let term = tokens(original_term);
    let matched = CANONICAL_NAMES
        .iter()
        .filter(|(regional, _)| contains_phrase(&term, regional))
        .max_by_key(|(regional, _)| regional.len())
        .map(|(_, canonical)| canonical.to_string());

    if let Some(canonical) = matched {
        // Keep a qualified delegate name like "Refined Wheat Flour (Maida)".
        if !delegate_name.trim().is_empty()
            && delegate_name.to_lowercase().contains(&canonical.to_lowercase())
        {
            return delegate_name.trim().to_string();
        }
        return canonical;
    }

    if delegate_name.trim().is_empty() {
        original_term.trim().to_string()
    } else {
        delegate_name.trim().to_string()
    }
}

/// Hidden components: the delegate's list plus every composite expansion
/// that applies, deduplicated case-insensitively, delegate order first.
pub fn hidden_components(
    original_term: &str,
    canonical: &str,
    delegate_hidden: &[String],
) -> Vec<String> {
    let term = tokens(original_term);
    let name = tokens(canonical);

    let mut out: Vec<String> = Vec::new();
    let mut push = |item: &str| {
        let item = item.trim();
        if !item.is_empty() && !out.iter().any(|o| o.eq_ignore_ascii_case(item)) {
            out.push(item.to_string());
        }
    };

    for item in delegate_hidden {
        push(item);
    }

    for composite in COMPOSITES {
        let triggered = composite
            .triggers
            .iter()
            .any(|t| contains_phrase(&term, t) || contains_phrase(&name, t));
        let cancelled = composite
            .unless
            .iter()
            .any(|u| contains_phrase(&term, u) || contains_phrase(&name, u));
        if triggered && !cancelled {
            for implied in composite.implies {
                push(implied);
            }
        }
    }

    out
}

/// Map one delegate flag onto the taxonomy. Unknown flags are dropped.
pub fn tag_from_flag(flag: &str) -> Option<RiskTag> {
    let words = tokens(flag);
    if words.iter().any(|w| w == "free") {
        return None;
    }

    let has = |candidates: &[&str]| words.iter().any(|w| candidates.contains(&w.as_str()));

    if has(&["glycemic", "gi", "sugar", "sugars"]) {
        Some(RiskTag::Glycemic)
    } else if has(&["inflammatory", "inflammation"]) {
        Some(RiskTag::Inflammatory)
    } else if has(&["gluten", "wheat"]) {
        Some(RiskTag::Gluten)
    } else if has(&["dairy", "milk", "lactose"]) {
        Some(RiskTag::Dairy)
    } else if has(&["soy", "soya"]) {
        Some(RiskTag::Soy)
    } else if has(&["nut", "nuts", "peanut", "peanuts"]) {
        Some(RiskTag::Nut)
    } else if has(&["sodium", "salt"]) {
        Some(RiskTag::Sodium)
    } else {
        None
    }
}

/// Risk tags from the canonical name, hidden components and delegate flags.
pub fn risk_tags(
    canonical: &str,
    hidden: &[String],
    delegate_flags: &[String],
) -> BTreeSet<RiskTag> {
    let mut tags = BTreeSet::new();

    for text in std::iter::once(canonical).chain(hidden.iter().map(String::as_str)) {
        let words = tokens(text);
        for (tag, keywords) in TAG_KEYWORDS {
            if keywords.iter().any(|k| contains_phrase(&words, k)) {
                tags.insert(*tag);
            }
        }
    }

    for flag in delegate_flags {
        match tag_from_flag(flag) {
            Some(tag) => {
                tags.insert(tag);
            }
            None => tracing::debug!(flag = %flag, "Dropping risk flag outside taxonomy"),
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(items: &[&str]) -> Vec<String> {
        items.iter().map(|i| i.to_string()).collect()
    }

    #[test]
    fn regional_names_are_canonicalized() {
        assert_eq!(canonical_name("Maida", ""), "Refined Wheat Flour");
        assert_eq!(canonical_name("Sooji", "Semolina"), "Semolina (Wheat)");
        assert_eq!(canonical_name("SENDHA NAMAK", ""), "Rock Salt");
        assert_eq!(canonical_name("Hing", "Ferula"), "Asafoetida");
    }

    #[test]
    fn qualified_delegate_name_is_kept() {
        assert_eq!(
            canonical_name("Maida", "Refined Wheat Flour (Maida)"),
            "Refined Wheat Flour (Maida)"
        );
    }

    #[test]
    fn unknown_terms_use_delegate_then_term() {
        assert_eq!(canonical_name("E621", "Monosodium Glutamate"), "Monosodium Glutamate");
        assert_eq!(canonical_name("  Quinoa ", ""), "Quinoa");
    }

    #[test]
    fn short_regional_words_match_whole_tokens_only() {
        assert_eq!(canonical_name("Yogurt", ""), "Yogurt");
        assert_eq!(canonical_name("Gur (Jaggery)", ""), "Jaggery");
    }

    #[test]
    fn hing_implies_wheat_unless_gluten_free() {
        assert_eq!(hidden_components("Hing", "Asafoetida", &[]), s(&["Wheat Flour"]));
        assert!(hidden_components("Gluten-Free Hing", "Asafoetida", &[]).is_empty());
        assert!(hidden_components("Gluten Free Asafoetida", "Asafoetida", &[]).is_empty());
    }

    #[test]
    fn composites_merge_with_delegate_list() {
        let hidden = hidden_components("Margarine", "Margarine", &s(&["milk solids", "Salt"]));
        assert_eq!(hidden, s(&["milk solids", "Salt", "Vegetable Fat"]));

        let sauce = hidden_components("Soy Sauce", "Soy Sauce", &[]);
        assert_eq!(sauce, s(&["Wheat", "Soy"]));
    }

    #[test]
    fn tags_follow_name_and_hidden_components() {
        let tags = risk_tags("Asafoetida", &s(&["Wheat Flour"]), &[]);
        assert!(tags.contains(&RiskTag::Gluten));

        let tags = risk_tags("Refined Wheat Flour", &[], &[]);
        assert_eq!(tags, BTreeSet::from([RiskTag::Gluten, RiskTag::Glycemic]));

        let tags = risk_tags("Palm Oil", &[], &[]);
        assert_eq!(tags, BTreeSet::from([RiskTag::Inflammatory]));
    }

    #[test]
    fn buckwheat_is_not_gluten() {
        assert!(risk_tags("Buckwheat Flour", &[], &[]).is_empty());
    }

    #[test]
    fn delegate_flags_map_onto_taxonomy() {
        assert_eq!(tag_from_flag("High Glycemic Index"), Some(RiskTag::Glycemic));
        assert_eq!(tag_from_flag("Inflammatory"), Some(RiskTag::Inflammatory));
        assert_eq!(tag_from_flag("Allergen: Wheat"), Some(RiskTag::Gluten));
        assert_eq!(tag_from_flag("nut"), Some(RiskTag::Nut));
        assert_eq!(tag_from_flag("gluten-free"), None);
        assert_eq!(tag_from_flag("Allergen"), None);
        assert_eq!(tag_from_flag("ultra processed"), None);
    }

    #[test]
    fn unknown_flags_are_dropped() {
        let tags = risk_tags("Water", &[], &s(&["Trendy", "carcinogen?"]));
        assert!(tags.is_empty());
    }
}
