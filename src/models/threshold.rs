use serde::Serialize;

/// EF readings below this are considered elevated risk.
pub const EF_RISK_LIMIT: f64 = 40.0;

/// Per-metric comparison policy. A violated rule marks the report High Risk.
///
/// `condition` serializes with the same wire strings as the threshold settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "condition")]
pub enum ThresholdRule {
    #[serde(rename = "greater than")]
    GreaterThan { limit: f64 },
    #[serde(rename = "less than")]
    LessThan { limit: f64 },
    /// Invariant: `low <= high`.
    #[serde(rename = "between")]
    Between { low: f64, high: f64 },
}

impl ThresholdRule {
    /// The safety rule applied to every metric whose name contains "EF".
    pub const fn ef_default() -> Self {
        Self::LessThan {
            limit: EF_RISK_LIMIT,
        }
    }

    pub fn between(a: f64, b: f64) -> Self {
        if a <= b {
            Self::Between { low: a, high: b }
        } else {
            Self::Between { low: b, high: a }
        }
    }

    /// True when `value` falls on the risky side of the rule.
    pub fn is_violated_by(&self, value: f64) -> bool {
        match *self {
            Self::GreaterThan { limit } => value > limit,
            Self::LessThan { limit } => value < limit,
            Self::Between { low, high } => value < low || value > high,
        }
    }
}

impl std::fmt::Display for ThresholdRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GreaterThan { limit } => write!(f, "greater than {limit}"),
            Self::LessThan { limit } => write!(f, "less than {limit}"),
            Self::Between { low, high } => write!(f, "between {low} and {high}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ThresholdCondition;

    #[test]
    fn greater_than_violated_above_limit() {
        let rule = ThresholdRule::GreaterThan { limit: 120.0 };
        assert!(rule.is_violated_by(121.0));
        assert!(!rule.is_violated_by(120.0));
    }

    #[test]
    fn less_than_violated_below_limit() {
        let rule = ThresholdRule::ef_default();
        assert!(rule.is_violated_by(39.9));
        assert!(!rule.is_violated_by(40.0));
    }

    #[test]
    fn between_is_inclusive() {
        let rule = ThresholdRule::between(25.0, 18.0);
        assert_eq!(rule, ThresholdRule::Between { low: 18.0, high: 25.0 });
        assert!(!rule.is_violated_by(18.0));
        assert!(!rule.is_violated_by(25.0));
        assert!(rule.is_violated_by(28.0));
        assert!(rule.is_violated_by(17.5));
    }

    #[test]
    fn condition_uses_settings_wire_strings() {
        let json = serde_json::to_value(ThresholdRule::ef_default()).unwrap();
        assert_eq!(json, serde_json::json!({"condition": "less than", "limit": 40.0}));
        let json = serde_json::to_value(ThresholdRule::GreaterThan { limit: 30.0 }).unwrap();
        assert_eq!(json["condition"], ThresholdCondition::GreaterThan.as_str());
        let json = serde_json::to_value(ThresholdRule::between(18.0, 25.0)).unwrap();
        assert_eq!(json["condition"], "between");
    }

    #[test]
    fn display_reads_like_settings() {
        assert_eq!(ThresholdRule::ef_default().to_string(), "less than 40");
        assert_eq!(ThresholdRule::between(18.0, 25.0).to_string(), "between 18 and 25");
    }
}
