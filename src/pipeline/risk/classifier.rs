use serde::Serialize;

use super::thresholds::ThresholdRules;
use crate::models::{MetricReadings, RiskVerdict, ThresholdRule};

/// The metric that forced a High Risk verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskTrigger {
    pub metric: String,
    /// Compared value (lower bound for ranges).
    pub value: f64,
    pub rule: ThresholdRule,
}

/// Verdict plus diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub verdict: RiskVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<RiskTrigger>,
    /// Metrics that had a number and at least one applicable rule.
    pub evaluated: usize,
}

impl RiskAssessment {
    fn not_applicable() -> Self {
        Self {
            verdict: RiskVerdict::NotApplicable,
            trigger: None,
            evaluated: 0,
        }
    }
}

/// Rules that apply to a metric, EF safety check first.
///
/// A name containing "EF" always gets the `< 40` check; a configured rule is
/// applied in addition, never instead. Other metrics need a configured rule.
pub fn applicable_rules(metric: &str, rules: &ThresholdRules) -> Vec<ThresholdRule> {
    let mut applicable = Vec::with_capacity(2);
    if metric.contains("EF") {
        applicable.push(ThresholdRule::ef_default());
    }
    if let Some(rule) = rules.get(metric) {
        applicable.push(*rule);
    }
    applicable
}

/// Evaluate readings against threshold rules, in schema order.
///
/// The first violated rule short-circuits to High Risk. With no numeric
/// reading at all the verdict is Not Applicable.
pub fn assess_risk(readings: &MetricReadings, rules: &ThresholdRules) -> RiskAssessment {
    if readings.numeric_count() == 0 {
        return RiskAssessment::not_applicable();
    }

    let mut evaluated = 0;
    for (metric, value) in readings.iter() {
        let Some(v) = value.comparison_value() else {
            continue;
        };
        let applicable = applicable_rules(metric, rules);
        if applicable.is_empty() {
            tracing::trace!(metric, "No threshold for metric, informational only");
            continue;
        }
        evaluated += 1;

        if let Some(rule) = applicable.into_iter().find(|r| r.is_violated_by(v)) {
            tracing::debug!(metric, value = v, rule = %rule, "Threshold violated");
            return RiskAssessment {
                verdict: RiskVerdict::HighRisk,
                trigger: Some(RiskTrigger {
                    metric: metric.to_string(),
                    value: v,
                    rule,
                }),
                evaluated,
            };
        }
    }

    RiskAssessment {
        verdict: RiskVerdict::LowRisk,
        trigger: None,
        evaluated,
    }
}

/// Verdict only.
pub fn classify_risk(readings: &MetricReadings, rules: &ThresholdRules) -> RiskVerdict {
    assess_risk(readings, rules).verdict
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetricValue;

    fn readings(entries: &[(&str, MetricValue)]) -> MetricReadings {
        let mut r = MetricReadings::absent(entries.iter().map(|(n, _)| *n));
        for (name, value) in entries {
            r.set(name, *value);
        }
        r
    }

    fn rules(entries: &[(&str, ThresholdRule)]) -> ThresholdRules {
        entries.iter().map(|(n, r)| (n.to_string(), *r)).collect()
    }

    #[test]
    fn ef_default_rule_flags_low_lvef() {
        let r = readings(&[("LVEF", MetricValue::Scalar(35.0))]);
        assert_eq!(classify_risk(&r, &ThresholdRules::new()), RiskVerdict::HighRisk);
    }

    #[test]
    fn normal_lvef_is_low_risk() {
        let r = readings(&[("LVEF", MetricValue::Scalar(55.0))]);
        assert_eq!(classify_risk(&r, &ThresholdRules::new()), RiskVerdict::LowRisk);
    }

    #[test]
    fn between_rule_on_custom_metric() {
        let bmi_rule = rules(&[("BMI", ThresholdRule::between(18.0, 25.0))]);
        let high = readings(&[("BMI", MetricValue::Scalar(28.0))]);
        let normal = readings(&[("BMI", MetricValue::Scalar(22.0))]);
        assert_eq!(classify_risk(&high, &bmi_rule), RiskVerdict::HighRisk);
        assert_eq!(classify_risk(&normal, &bmi_rule), RiskVerdict::LowRisk);
    }

    #[test]
    fn greater_than_rule() {
        let hr = rules(&[("Heart Rate", ThresholdRule::GreaterThan { limit: 100.0 })]);
        let r = readings(&[("Heart Rate", MetricValue::Scalar(110.0))]);
        assert_eq!(classify_risk(&r, &hr), RiskVerdict::HighRisk);
    }

    #[test]
    fn no_numeric_values_is_not_applicable() {
        let r = readings(&[("LVEF", MetricValue::Absent), ("EF-A2C", MetricValue::Absent)]);
        let assessment = assess_risk(&r, &ThresholdRules::new());
        assert_eq!(assessment.verdict, RiskVerdict::NotApplicable);
        assert_eq!(assessment.evaluated, 0);
    }

    #[test]
    fn range_compares_by_lower_bound() {
        let r = readings(&[("LVEF", MetricValue::range(35.0, 45.0))]);
        let assessment = assess_risk(&r, &ThresholdRules::new());
        assert_eq!(assessment.verdict, RiskVerdict::HighRisk);
        assert_eq!(assessment.trigger.unwrap().value, 35.0);
    }

    #[test]
    fn unruled_metric_is_informational() {
        let r = readings(&[("BMI", MetricValue::Scalar(45.0))]);
        let assessment = assess_risk(&r, &ThresholdRules::new());
        assert_eq!(assessment.verdict, RiskVerdict::LowRisk);
        assert_eq!(assessment.evaluated, 0);
    }

    #[test]
    fn ef_safety_check_survives_looser_rule() {
        // Configured "< 30" would pass 35; the EF default still catches it.
        let loose = rules(&[("LVEF", ThresholdRule::LessThan { limit: 30.0 })]);
        let r = readings(&[("LVEF", MetricValue::Scalar(35.0))]);
        let assessment = assess_risk(&r, &loose);
        assert_eq!(assessment.verdict, RiskVerdict::HighRisk);
        assert_eq!(assessment.trigger.unwrap().rule, ThresholdRule::ef_default());
    }

    #[test]
    fn stricter_configured_rule_also_applies() {
        let strict = rules(&[("LVEF", ThresholdRule::LessThan { limit: 50.0 })]);
        let r = readings(&[("LVEF", MetricValue::Scalar(45.0))]);
        let assessment = assess_risk(&r, &strict);
        assert_eq!(assessment.verdict, RiskVerdict::HighRisk);
        assert_eq!(
            assessment.trigger.unwrap().rule,
            ThresholdRule::LessThan { limit: 50.0 }
        );
    }

    #[test]
    fn trigger_is_first_failing_metric_in_order() {
        let r = readings(&[
            ("LVEF", MetricValue::Scalar(55.0)),
            ("EF-A2C", MetricValue::Scalar(30.0)),
            ("EF-A4C", MetricValue::Scalar(25.0)),
        ]);
        let assessment = assess_risk(&r, &ThresholdRules::new());
        let trigger = assessment.trigger.unwrap();
        assert_eq!(trigger.metric, "EF-A2C");
        assert_eq!(assessment.evaluated, 2);
    }

    #[test]
    fn ef_match_is_case_sensitive() {
        let r = readings(&[("ef-custom", MetricValue::Scalar(10.0))]);
        assert_eq!(classify_risk(&r, &ThresholdRules::new()), RiskVerdict::LowRisk);
        assert!(applicable_rules("ef-custom", &ThresholdRules::new()).is_empty());
        assert_eq!(applicable_rules("EF-Other", &ThresholdRules::new()).len(), 1);
    }
}
