use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// A single parsed metric reading.
///
/// Serializes as `null`, a bare number, or `{"low": .., "high": ..}` so the
/// presentation layer can consume it without knowing the Rust type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// No value reported, or an explicit "not found" marker.
    #[default]
    Absent,
    Scalar(f64),
    /// Invariant: `low <= high` (use [`MetricValue::range`]).
    Range { low: f64, high: f64 },
}

impl MetricValue {
    /// Build a range, ordering the bounds.
    pub fn range(a: f64, b: f64) -> Self {
        if a <= b {
            Self::Range { low: a, high: b }
        } else {
            Self::Range { low: b, high: a }
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The number used for threshold comparison.
    /// Ranges compare by their lower bound, the clinically conservative one.
    pub fn comparison_value(&self) -> Option<f64> {
        match self {
            Self::Absent => None,
            Self::Scalar(v) => Some(*v),
            Self::Range { low, .. } => Some(*low),
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => f.write_str("NA"),
            Self::Scalar(v) => write!(f, "{v}"),
            Self::Range { low, high } => write!(f, "{low}-{high}"),
        }
    }
}

/// Metric readings for one report, in schema order.
///
/// The key set always equals the schema the readings were built from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricReadings {
    entries: Vec<(String, MetricValue)>,
}

impl MetricReadings {
    /// All-absent readings for the given metric names.
    pub fn absent<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            entries: names
                .into_iter()
                .map(|n| (n.to_string(), MetricValue::Absent))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Overwrite the value of an existing metric. Unknown names are ignored
    /// so the key set never drifts from the schema.
    pub(crate) fn set(&mut self, name: &str, value: MetricValue) -> bool {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => {
                entry.1 = value;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn all_absent(&self) -> bool {
        self.entries.iter().all(|(_, v)| v.is_absent())
    }

    /// Number of metrics carrying a usable number.
    pub fn numeric_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, v)| v.comparison_value().is_some())
            .count()
    }
}

impl Serialize for MetricReadings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
