use crate::models::{ConditionFlag, ConditionProfile};

/// Static description of one evaluator capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySpec {
    /// Key in the verdict mapping.
    pub capability_name: &'static str,
    /// What the capability checks, as the consumer reads it.
    pub label: &'static str,
    /// Conditions that activate the capability.
    pub keywords: &'static [ConditionFlag],
    pub always_on: bool,
}

impl CapabilitySpec {
    /// Invoked iff its keywords intersect the profile, or it is always-on.
    pub fn activated_by(&self, profile: &ConditionProfile) -> bool {
        self.always_on || self.keywords.iter().any(|flag| profile.contains(*flag))
    }
}

pub const CELIAC: CapabilitySpec = CapabilitySpec {
    capability_name: "celiac",
    label: "gluten sensitivity",
    keywords: &[ConditionFlag::GlutenSensitivity],
    always_on: false,
};

pub const METABOLIC: CapabilitySpec = CapabilitySpec {
    capability_name: "metabolic",
    label: "blood sugar and blood pressure",
    keywords: &[ConditionFlag::GlycemicRisk, ConditionFlag::Hypertension],
    always_on: false,
};

pub const ALLERGEN: CapabilitySpec = CapabilitySpec {
    capability_name: "allergen",
    label: "dairy, nut and soy allergies",
    keywords: &[
        ConditionFlag::LactoseSensitivity,
        ConditionFlag::NutAllergy,
        ConditionFlag::SoyAllergy,
    ],
    always_on: false,
};

pub const ADDITIVE: CapabilitySpec = CapabilitySpec {
    capability_name: "additive",
    label: "additives and processed oils",
    keywords: &[],
    always_on: true,
};

/// Default registry. Exactly one always-on capability.
pub const DEFAULT_CAPABILITIES: &[CapabilitySpec] = &[CELIAC, METABOLIC, ALLERGEN, ADDITIVE];

/// Capabilities the profile activates, in registry order.
pub fn select<'a>(
    registry: &'a [CapabilitySpec],
    profile: &ConditionProfile,
) -> Vec<&'a CapabilitySpec> {
    registry.iter().filter(|spec| spec.activated_by(profile)).collect()
}

/// Consumer-facing label for a capability name; the name itself if unknown.
pub fn label_for(capability_name: &str) -> &str {
    DEFAULT_CAPABILITIES
        .iter()
        .find(|spec| spec.capability_name == capability_name)
        .map(|spec| spec.label)
        .unwrap_or(capability_name)
}
