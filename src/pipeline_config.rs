//! Processor configuration: user-defined metrics and threshold settings.
//!
//! Passed explicitly into every pipeline call; the core never reads ambient
//! state. Loading from disk is a convenience for the CLI.
//!
//! ```text
//! {
//!   "custom_metrics": ["BMI"],
//!   "thresholds": { "BMI": { "condition": "between", "value": 18.5, "value2": 25 } }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;
use crate::models::{MetricSchema, SchemaError};
use crate::pipeline::risk::{ThresholdRules, ThresholdSettings};

/// Config file name under the application data directory.
pub const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {0}: {1}")]
    Read(String, String),

    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("Invalid metric schema: {0}")]
    Schema(#[from] SchemaError),
}

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Extra metrics appended after the standard EF metrics.
    pub custom_metrics: Vec<String>,
    pub thresholds: ThresholdSettings,
}

// ═══════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════

impl ProcessorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.display().to_string(), e.to_string()))?;
        Self::from_json_str(&json)
    }

    /// `<data dir>/hfscan/config.json`
    pub fn default_path() -> PathBuf {
        config::app_data_dir().join(CONFIG_FILE)
    }

    /// Standard EF metrics plus the custom ones.
    pub fn schema(&self) -> Result<MetricSchema, ConfigError> {
        Ok(MetricSchema::with_custom(&self.custom_metrics)?)
    }

    pub fn rules(&self) -> ThresholdRules {
        self.thresholds.rules()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
