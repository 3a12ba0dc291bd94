//! Threshold settings as stored by the configuration collaborator.
//!
//! Wire form, one entry per metric:
//! ```text
//! { "BMI": { "condition": "between", "value": 18.5, "value2": 25 } }
//! ```
//! Entries are read leniently: an entry that does not deserialize is skipped
//! with a warning instead of rejecting the whole document.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use super::ThresholdError;
use crate::models::{ThresholdCondition, ThresholdRule, EF_RISK_LIMIT};

/// Settings file name under the application data directory.
pub const THRESHOLD_SETTINGS_FILE: &str = "threshold_settings.json";

/// Resolved per-metric rules, the classifier's input.
pub type ThresholdRules = HashMap<String, ThresholdRule>;

/// Accepts `40`, `40.5`, `"40"` or `null`. UI layers often persist numbers as text.
fn deserialize_flexible_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64()),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("not a number: {s:?}"))),
        Some(other) => Err(D::Error::custom(format!("not a number: {other}"))),
    }
}

/// One metric's configured threshold, as persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSetting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ThresholdCondition>,
    #[serde(
        default,
        deserialize_with = "deserialize_flexible_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<f64>,
    #[serde(
        default,
        deserialize_with = "deserialize_flexible_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub value2: Option<f64>,
}

impl ThresholdSetting {
    /// Resolve to a rule, defaulting a missing condition to "less than" and a
    /// missing value to 40. "between" without `value2` yields no rule.
    pub fn resolve(&self) -> Option<ThresholdRule> {
        let limit = self.value.unwrap_or(EF_RISK_LIMIT);
        match self.condition.unwrap_or(ThresholdCondition::LessThan) {
            ThresholdCondition::LessThan => Some(ThresholdRule::LessThan { limit }),
            ThresholdCondition::GreaterThan => Some(ThresholdRule::GreaterThan { limit }),
            ThresholdCondition::Between => self.value2.map(|high| ThresholdRule::between(limit, high)),
        }
    }
}

/// The full threshold configuration: metric name → setting.
///
/// Read-only input to every classification; never mutated by the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ThresholdSettings {
    settings: BTreeMap<String, ThresholdSetting>,
}

impl ThresholdSettings {
    /// Parse a settings document, skipping entries that do not deserialize.
    pub fn from_json_str(json: &str) -> Result<Self, ThresholdError> {
        let raw: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(json).map_err(|e| ThresholdError::Parse(e.to_string()))?;
        Ok(Self::from_raw(raw))
    }

    /// Load a settings document from disk.
    pub fn load(path: &Path) -> Result<Self, ThresholdError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ThresholdError::Read(path.display().to_string(), e.to_string()))?;
        let settings = Self::from_json_str(&json)?;
        tracing::debug!(
            path = %path.display(),
            metrics = settings.len(),
            "Loaded threshold settings"
        );
        Ok(settings)
    }

    fn from_raw(raw: BTreeMap<String, serde_json::Value>) -> Self {
        let settings = raw
            .into_iter()
            .filter_map(|(metric, v)| match serde_json::from_value::<ThresholdSetting>(v) {
                Ok(setting) => Some((metric, setting)),
                Err(e) => {
                    tracing::warn!(metric = %metric, error = %e, "Skipping invalid threshold setting");
                    None
                }
            })
            .collect();
        Self { settings }
    }

    pub fn insert(&mut self, metric: impl Into<String>, setting: ThresholdSetting) {
        self.settings.insert(metric.into(), setting);
    }

    pub fn get(&self, metric: &str) -> Option<&ThresholdSetting> {
        self.settings.get(metric)
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Resolve every setting into a classifier rule.
    pub fn rules(&self) -> ThresholdRules {
        self.settings
            .iter()
            .filter_map(|(metric, setting)| match setting.resolve() {
                Some(rule) => Some((metric.clone(), rule)),
                None => {
                    tracing::warn!(metric = %metric, "\"between\" threshold without value2, ignoring");
                    None
                }
            })
            .collect()
    }
}

impl<'de> Deserialize<'de> for ThresholdSettings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Self::from_raw(raw))
    }
}
