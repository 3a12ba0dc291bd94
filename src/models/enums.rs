use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde uses the same wire strings as `as_str`.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
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

str_enum!(ThresholdCondition {
    GreaterThan => "greater than",
    LessThan => "less than",
    Between => "between",
});

str_enum!(RiskVerdict {
    HighRisk => "High Risk",
    LowRisk => "Low Risk",
    NotApplicable => "NA",
});

impl RiskVerdict {
    /// True when the presentation layer should flag the report.
    pub fn is_high(&self) -> bool {
        matches!(self, Self::HighRisk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn threshold_condition_round_trip() {
        for (variant, s) in [
            (ThresholdCondition::GreaterThan, "greater than"),
            (ThresholdCondition::LessThan, "less than"),
            (ThresholdCondition::Between, "between"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ThresholdCondition::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn risk_verdict_round_trip() {
        for (variant, s) in [
            (RiskVerdict::HighRisk, "High Risk"),
            (RiskVerdict::LowRisk, "Low Risk"),
            (RiskVerdict::NotApplicable, "NA"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(RiskVerdict::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn serde_uses_wire_strings() {
        let json = serde_json::to_string(&ThresholdCondition::GreaterThan).unwrap();
        assert_eq!(json, "\"greater than\"");
        let verdict: RiskVerdict = serde_json::from_str("\"High Risk\"").unwrap();
        assert_eq!(verdict, RiskVerdict::HighRisk);
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(ThresholdCondition::from_str("above").is_err());
        assert!(RiskVerdict::from_str("").is_err());
    }

    #[test]
    fn only_high_risk_is_high() {
        assert!(RiskVerdict::HighRisk.is_high());
        assert!(!RiskVerdict::LowRisk.is_high());
        assert!(!RiskVerdict::NotApplicable.is_high());
    }
}
