//! Ejection-fraction extraction and heart-failure risk classification.
//!
//! Turns report text produced upstream by OCR or an LLM into typed metric
//! readings and a per-report risk verdict:
//! ```text
//! text → sanitize → extract (lines | table | JSON) → classify → ExtractionResult
//! ```

pub mod config;
pub mod models;
pub mod pipeline;
pub mod pipeline_config;

pub use models::{MetricSchema, MetricValue, RiskVerdict, ThresholdRule};
pub use pipeline::{process_report, ExtractionResult, ReportProcessor};
pub use pipeline_config::ProcessorConfig;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries. RUST_LOG overrides the default filter;
/// an explicit `level` overrides both.
pub fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("{} v{} starting", config::APP_NAME, config::APP_VERSION);
}
