use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::enums::RiskTag;

/// One ingredient after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedIngredient {
    /// Term as printed on the label.
    pub original_term: String,
    /// Canonical English/scientific name.
    pub canonical_name: String,
    pub risk_tags: BTreeSet<RiskTag>,
    /// Sub-components implied by a composite ingredient, in label order.
    pub hidden_components: Vec<String>,
    pub explanation: String,
}

impl NormalizedIngredient {
    pub fn has_tag(&self, tag: RiskTag) -> bool {
        self.risk_tags.contains(&tag)
    }
}

/// Ordered ingredient list. Order mirrors the label and is kept for display only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedIngredientSet {
    ingredients: Vec<NormalizedIngredient>,
}

impl NormalizedIngredientSet {
    pub fn new(ingredients: Vec<NormalizedIngredient>) -> Self {
        Self { ingredients }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedIngredient> {
        self.ingredients.iter()
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }

    /// Union of every ingredient's risk tags.
    pub fn risk_tags(&self) -> BTreeSet<RiskTag> {
        self.ingredients
            .iter()
            .flat_map(|i| i.risk_tags.iter().copied())
            .collect()
    }
}

impl<'a> IntoIterator for &'a NormalizedIngredientSet {
    type Item = &'a NormalizedIngredient;
    type IntoIter = std::slice::Iter<'a, NormalizedIngredient>;

    fn into_iter(self) -> Self::IntoIter {
        self.ingredients.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(name: &str, tags: &[RiskTag]) -> NormalizedIngredient {
        NormalizedIngredient {
            original_term: name.into(),
            canonical_name: name.into(),
            risk_tags: tags.iter().copied().collect(),
            hidden_components: vec![],
            explanation: String::new(),
        }
    }

    #[test]
    fn set_serializes_as_plain_array() {
        let set = NormalizedIngredientSet::new(vec![ingredient("Salt", &[RiskTag::Sodium])]);
        let json = serde_json::to_value(&set).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["risk_tags"][0], "sodium");
    }

    #[test]
    fn risk_tags_are_unioned() {
        let set = NormalizedIngredientSet::new(vec![
            ingredient("Maida", &[RiskTag::Gluten, RiskTag::Glycemic]),
            ingredient("Sugar", &[RiskTag::Glycemic]),
        ]);
        let tags = set.risk_tags();
        assert_eq!(tags.len(), 2);
        assert!(tags.contains(&RiskTag::Gluten));
    }

    #[test]
    fn order_is_preserved() {
        let set = NormalizedIngredientSet::new(vec![
            ingredient("Sugar", &[]),
            ingredient("Atta", &[]),
        ]);
        let names: Vec<_> = set.iter().map(|i| i.canonical_name.as_str()).collect();
        assert_eq!(names, vec!["Sugar", "Atta"]);
    }
}
