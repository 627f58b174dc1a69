use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::enums::ConditionFlag;
use super::ModelError;

/// Words in a user-declared condition label that imply a flag.
/// Matched against whole lower-cased tokens, never substrings.
const LABEL_KEYWORDS: &[(&str, ConditionFlag)] = &[
    ("celiac", ConditionFlag::GlutenSensitivity),
    ("coeliac", ConditionFlag::GlutenSensitivity),
    ("gluten", ConditionFlag::GlutenSensitivity),
    ("wheat", ConditionFlag::GlutenSensitivity),
    ("diabetes", ConditionFlag::GlycemicRisk),
    ("diabetic", ConditionFlag::GlycemicRisk),
    ("sugar", ConditionFlag::GlycemicRisk),
    ("insulin", ConditionFlag::GlycemicRisk),
    ("prediabetes", ConditionFlag::GlycemicRisk),
    ("bp", ConditionFlag::Hypertension),
    ("hypertension", ConditionFlag::Hypertension),
    ("pressure", ConditionFlag::Hypertension),
    ("lactose", ConditionFlag::LactoseSensitivity),
    ("dairy", ConditionFlag::LactoseSensitivity),
    ("milk", ConditionFlag::LactoseSensitivity),
    ("nut", ConditionFlag::NutAllergy),
    ("nuts", ConditionFlag::NutAllergy),
    ("peanut", ConditionFlag::NutAllergy),
    ("peanuts", ConditionFlag::NutAllergy),
    ("soy", ConditionFlag::SoyAllergy),
    ("soya", ConditionFlag::SoyAllergy),
];

/// Words naming an allergy without saying which one.
const GENERIC_ALLERGY_WORDS: &[&str] = &["allergy", "allergies", "allergic"];

/// Flags a generic allergy label implies: every flag the allergen check
/// covers, so that check runs.
const GENERIC_ALLERGY_FLAGS: &[ConditionFlag] = &[
    ConditionFlag::LactoseSensitivity,
    ConditionFlag::NutAllergy,
    ConditionFlag::SoyAllergy,
];

/// The consumer's conditions for one request. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionProfile {
    flags: BTreeSet<ConditionFlag>,
}

impl ConditionProfile {
    pub fn new(flags: impl IntoIterator<Item = ConditionFlag>) -> Self {
        Self {
            flags: flags.into_iter().collect(),
        }
    }

    /// Derive a profile from free-form condition labels ("Celiac Disease",
    /// "Type 2 Diabetes", "BP"). Labels that imply no flag are skipped;
    /// "General Health" therefore yields an empty profile.
    pub fn from_declared<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut flags = BTreeSet::new();
        for label in labels {
            match parse_condition_label(label.as_ref()) {
                Ok(found) => flags.extend(found),
                Err(e) => tracing::warn!(error = %e, "Declared condition ignored"),
            }
        }
        Self { flags }
    }

    pub fn flags(&self) -> &BTreeSet<ConditionFlag> {
        &self.flags
    }

    pub fn contains(&self, flag: ConditionFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Human-readable summary for prompts, e.g. "gluten-sensitivity, glycemic-risk".
    pub fn describe(&self) -> String {
        if self.flags.is_empty() {
            return "general health (no declared conditions)".to_string();
        }
        self.flags
            .iter()
            .map(ConditionFlag::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<ConditionFlag> for ConditionProfile {
    fn from_iter<T: IntoIterator<Item = ConditionFlag>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Parse one condition label into the flags it implies.
///
/// Accepts canonical flag names ("nut-allergy") and everyday labels
/// ("Lactose Intolerance"). Fails when nothing in the label is recognized.
pub fn parse_condition_label(label: &str) -> Result<Vec<ConditionFlag>, ModelError> {
    let trimmed = label.trim();
    if let Ok(flag) = ConditionFlag::from_str(&trimmed.to_lowercase()) {
        return Ok(vec![flag]);
    }

    let tokens: Vec<String> = trimmed
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect();

    let mut found = Vec::new();
    for token in &tokens {
        for (keyword, flag) in LABEL_KEYWORDS {
            if token == keyword && !found.contains(flag) {
                found.push(*flag);
            }
        }
    }

    // "Food Allergy", "Shellfish Allergy": no specific flag, but still an allergy.
    if found.is_empty()
        && tokens
            .iter()
            .any(|t| GENERIC_ALLERGY_WORDS.contains(&t.as_str()))
    {
        found.extend_from_slice(GENERIC_ALLERGY_FLAGS);
    }

    if found.is_empty() {
        Err(ModelError::UnknownCondition(trimmed.to_string()))
    } else {
        Ok(found)
    }
}
