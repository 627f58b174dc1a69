use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Variants serialize to the same string `as_str` returns.
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            /// Every variant, in declaration order.
            pub fn all() -> &'static [Self] {
                &[$(Self::$variant),+]
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(
    /// A health condition the consumer declared. Evaluators key off these.
    ConditionFlag {
        GlutenSensitivity => "gluten-sensitivity",
        GlycemicRisk => "glycemic-risk",
        Hypertension => "hypertension",
        LactoseSensitivity => "lactose-sensitivity",
        NutAllergy => "nut-allergy",
        SoyAllergy => "soy-allergy",
    }
);

str_enum!(
    /// Fixed risk taxonomy attached to normalized ingredients.
    RiskTag {
        Glycemic => "glycemic",
        Inflammatory => "inflammatory",
        Gluten => "gluten",
        Dairy => "dairy",
        Soy => "soy",
        Nut => "nut",
        Sodium => "sodium",
    }
);

str_enum!(
    /// Outcome of a single evaluator capability.
    Verdict {
        Safe => "SAFE",
        Unsafe => "UNSAFE",
        Risky => "RISKY",
        Error => "ERROR",
    }
);

str_enum!(
    /// Overall characterization of a product for one profile.
    ///
    /// Declaration order is severity order: `Safe < Unverified < Risky < Unsafe`.
    Severity {
        Safe => "SAFE",
        Unverified => "UNVERIFIED",
        Risky => "RISKY",
        Unsafe => "UNSAFE",
    }
);

str_enum!(
    /// Declared kind of a raw input. Optional hint from the caller.
    InputKind {
        FreeText => "free_text",
        ImagePayload => "image",
        WebLink => "web_link",
    }
);

impl Verdict {
    /// ERROR verdicts carry no finding and never count toward the Red-Flag rule.
    pub fn is_finding(&self) -> bool {
        !matches!(self, Self::Error)
    }
}

impl Severity {
    /// Headline shown at the top of every report.
    pub fn headline(&self) -> &'static str {
        match self {
            Self::Unsafe => "🛑 UNSAFE for your health profile.",
            Self::Risky => "⚠️ RISKY for your health profile: check the details below.",
            Self::Unverified => "❔ UNVERIFIED: we could not complete every safety check.",
            Self::Safe => "✅ SAFE for your health profile.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn condition_flag_round_trip() {
        for flag in ConditionFlag::all() {
            assert_eq!(ConditionFlag::from_str(flag.as_str()).unwrap(), *flag);
        }
    }

    #[test]
    fn unknown_condition_is_rejected() {
        let err = ConditionFlag::from_str("sweet-tooth").unwrap_err();
        assert!(err.to_string().contains("sweet-tooth"));
    }

    #[test]
    fn verdict_serializes_upper_case() {
        let json = serde_json::to_string(&Verdict::Unsafe).unwrap();
        assert_eq!(json, "\"UNSAFE\"");
        let back: Verdict = serde_json::from_str("\"RISKY\"").unwrap();
        assert_eq!(back, Verdict::Risky);
    }

    #[test]
    fn severity_orders_by_danger() {
        assert!(Severity::Unsafe > Severity::Risky);
        assert!(Severity::Risky > Severity::Unverified);
        assert!(Severity::Unverified > Severity::Safe);
    }

    #[test]
    fn error_is_not_a_finding() {
        assert!(!Verdict::Error.is_finding());
        assert!(Verdict::Safe.is_finding());
        assert!(Verdict::Unsafe.is_finding());
    }

    #[test]
    fn headline_names_the_severity() {
        assert!(Severity::Unsafe.headline().contains("UNSAFE"));
        assert!(Severity::Safe.headline().contains("SAFE"));
    }
}
