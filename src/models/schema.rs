use serde::Serialize;
use thiserror::Error;

/// Canonical EF metric names, in report display order.
pub const DEFAULT_EF_METRICS: &[&str] = &[
    "LVEF",
    "EF-A2C",
    "EF-A4C",
    "EF-Biplane",
    "EF-PLAX",
    "EF-PSAX",
    "EF-Subcostal",
    "EF-Other",
    "EF-Global",
    "EF-Mmode",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Metric name must not be blank")]
    BlankName,

    #[error("Duplicate metric name: {0}")]
    Duplicate(String),
}

/// Ordered, duplicate-free set of metric names expected in a report.
///
/// Names are case-sensitive. Immutable once built; extraction takes it by
/// shared reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricSchema {
    names: Vec<String>,
}

impl MetricSchema {
    /// Build a schema from explicit names.
    pub fn new<I, S>(names: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut schema = Self { names: Vec::new() };
        for name in names {
            schema.push(name.as_ref())?;
        }
        Ok(schema)
    }

    /// The ten standard EF metrics plus user-defined ones appended in order.
    pub fn with_custom<I, S>(custom: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut schema = Self::default();
        for name in custom {
            schema.push(name.as_ref())?;
        }
        Ok(schema)
    }

    fn push(&mut self, name: &str) -> Result<(), SchemaError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SchemaError::BlankName);
        }
        if self.contains(name) {
            return Err(SchemaError::Duplicate(name.to_string()));
        }
        self.names.push(name.to_string());
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Lookup returning the canonical (declared) spelling. An exact match
    /// wins over a case-insensitive one.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|n| n.as_str() == key)
            .or_else(|| self.names.iter().find(|n| n.eq_ignore_ascii_case(key)))
            .map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for MetricSchema {
    fn default() -> Self {
        Self {
            names: DEFAULT_EF_METRICS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
