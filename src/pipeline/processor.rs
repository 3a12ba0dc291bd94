//! Report Pipeline: extract → classify for one report, packaged for display.
//!
//! Never propagates an error to its caller. A report that fails is turned
//! into a Not Applicable result carrying a diagnostic, so one bad report
//! cannot abort a batch.

use std::path::Path;

use serde::Serialize;
use uuid::Uuid;

use crate::models::{MetricReadings, MetricSchema, RiskVerdict};
use crate::pipeline::extraction::{extract_metrics, ExtractionError};
use crate::pipeline::risk::{assess_risk, RiskAssessment, RiskTrigger, ThresholdRules};
use crate::pipeline_config::{ConfigError, ProcessorConfig};

/// Display text when no metric carries a value.
pub const NO_VALUE_FOUND: &str = "No EF Value Found";

/// Separator between `name: value` pairs in the display string.
pub const DISPLAY_DELIMITER: &str = "; ";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while processing a single report.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Outcome for one report, consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub report_id: String,
    /// Every schema metric, in schema order.
    pub metrics: MetricReadings,
    /// `"LVEF: 38; EF-A2C: 50"`, or a placeholder / error marker.
    pub display: String,
    pub verdict: RiskVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<RiskTrigger>,
    /// Set when processing failed; `display` then carries the error marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl ExtractionResult {
    fn no_values(report_id: &str, schema: &MetricSchema) -> Self {
        Self {
            report_id: report_id.to_string(),
            metrics: MetricReadings::absent(schema.names()),
            display: NO_VALUE_FOUND.to_string(),
            verdict: RiskVerdict::NotApplicable,
            trigger: None,
            diagnostic: None,
        }
    }

    fn failed(report_id: &str, schema: &MetricSchema, error: &ProcessingError) -> Self {
        Self {
            report_id: report_id.to_string(),
            metrics: MetricReadings::absent(schema.names()),
            display: format!("Error: {error}"),
            verdict: RiskVerdict::NotApplicable,
            trigger: None,
            diagnostic: Some(error.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.diagnostic.is_some()
    }
}

/// Results of one batch run, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub results: Vec<ExtractionResult>,
    pub high_risk: usize,
    pub low_risk: usize,
    pub not_applicable: usize,
    pub failed: usize,
}

impl BatchReport {
    fn from_results(results: Vec<ExtractionResult>) -> Self {
        let count = |v: RiskVerdict| results.iter().filter(|r| r.verdict == v).count();
        Self {
            batch_id: Uuid::new_v4(),
            high_risk: count(RiskVerdict::HighRisk),
            low_risk: count(RiskVerdict::LowRisk),
            not_applicable: count(RiskVerdict::NotApplicable),
            failed: results.iter().filter(|r| r.is_failed()).count(),
            results,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Process one report: extract metrics, classify risk, render for display.
pub fn process_report(
    report_id: &str,
    raw_text: &str,
    schema: &MetricSchema,
    rules: &ThresholdRules,
) -> ExtractionResult {
    if raw_text.trim().is_empty() {
        tracing::debug!(report_id, "Empty report text");
        return ExtractionResult::no_values(report_id, schema);
    }

    match extract_and_classify(raw_text, schema, rules) {
        Ok((metrics, assessment)) => {
            tracing::debug!(
                report_id,
                verdict = assessment.verdict.as_str(),
                evaluated = assessment.evaluated,
                "Report classified"
            );
            ExtractionResult {
                report_id: report_id.to_string(),
                display: render_display(&metrics),
                metrics,
                verdict: assessment.verdict,
                trigger: assessment.trigger,
                diagnostic: None,
            }
        }
        Err(e) => {
            tracing::warn!(report_id, error = %e, "Report processing failed");
            ExtractionResult::failed(report_id, schema, &e)
        }
    }
}

fn extract_and_classify(
    raw_text: &str,
    schema: &MetricSchema,
    rules: &ThresholdRules,
) -> Result<(MetricReadings, RiskAssessment), ProcessingError> {
    let metrics = extract_metrics(raw_text, schema)?;
    let assessment = assess_risk(&metrics, rules);
    Ok((metrics, assessment))
}

/// `name: value` pairs for non-absent metrics, or the no-value placeholder.
pub fn render_display(metrics: &MetricReadings) -> String {
    let pairs: Vec<String> = metrics
        .iter()
        .filter(|(_, v)| !v.is_absent())
        .map(|(name, v)| format!("{name}: {v}"))
        .collect();
    if pairs.is_empty() {
        NO_VALUE_FOUND.to_string()
    } else {
        pairs.join(DISPLAY_DELIMITER)
    }
}

/// Report identifier from an uploaded file name: the name without extension.
pub fn report_id_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

/// Schema + resolved rules, shared read-only across reports (and threads).
#[derive(Debug, Clone)]
pub struct ReportProcessor {
    schema: MetricSchema,
    rules: ThresholdRules,
}

impl ReportProcessor {
    pub fn new(schema: MetricSchema, rules: ThresholdRules) -> Self {
        Self { schema, rules }
    }

    pub fn from_config(config: &ProcessorConfig) -> Result<Self, ProcessingError> {
        Ok(Self::new(config.schema()?, config.rules()))
    }

    pub fn schema(&self) -> &MetricSchema {
        &self.schema
    }

    pub fn rules(&self) -> &ThresholdRules {
        &self.rules
    }

    pub fn process(&self, report_id: &str, raw_text: &str) -> ExtractionResult {
        process_report(report_id, raw_text, &self.schema, &self.rules)
    }

    /// Run the pipeline once per `(report_id, text)`; reports are independent.
    pub fn process_batch<I, K, T>(&self, reports: I) -> BatchReport
    where
        I: IntoIterator<Item = (K, T)>,
        K: AsRef<str>,
        T: AsRef<str>,
    {
        let results: Vec<ExtractionResult> = reports
            .into_iter()
            .map(|(id, text)| self.process(id.as_ref(), text.as_ref()))
            .collect();
        let batch = BatchReport::from_results(results);
        tracing::info!(
            batch_id = %batch.batch_id,
            reports = batch.results.len(),
            high_risk = batch.high_risk,
            failed = batch.failed,
            "Batch processed"
        );
        batch
    }
}

impl Default for ReportProcessor {
    fn default() -> Self {
        Self::new(MetricSchema::default(), ThresholdRules::new())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetricValue, ThresholdRule};

    fn schema(names: &[&str]) -> MetricSchema {
        MetricSchema::new(names.iter().copied()).unwrap()
    }

    #[test]
    fn empty_text_is_not_applicable() {
        let s = MetricSchema::default();
        for text in ["", "   \n\t "] {
            let result = process_report("r1", text, &s, &ThresholdRules::new());
            assert_eq!(result.verdict, RiskVerdict::NotApplicable);
            assert_eq!(result.display, NO_VALUE_FOUND);
            assert_eq!(result.metrics.len(), 10);
            assert!(result.metrics.all_absent());
            assert!(!result.is_failed());
        }
    }

    #[test]
    fn low_lvef_end_to_end() {
        let s = schema(&["LVEF", "EF-A2C"]);
        let result = process_report("echo", "LVEF: 38%\nEF-A2C: 50%", &s, &ThresholdRules::new());
        assert_eq!(result.metrics.get("LVEF"), Some(&MetricValue::Scalar(38.0)));
        assert_eq!(result.metrics.get("EF-A2C"), Some(&MetricValue::Scalar(50.0)));
        assert_eq!(result.verdict, RiskVerdict::HighRisk);
        assert_eq!(result.display, "LVEF: 38; EF-A2C: 50");
        assert_eq!(result.trigger.unwrap().metric, "LVEF");
    }

    #[test]
    fn not_found_marker_end_to_end() {
        let s = schema(&["LVEF"]);
        let result = process_report("echo", "LVEF: No EF found", &s, &ThresholdRules::new());
        assert_eq!(result.metrics.get("LVEF"), Some(&MetricValue::Absent));
        assert_eq!(result.verdict, RiskVerdict::NotApplicable);
        assert_eq!(result.display, NO_VALUE_FOUND);
    }

    #[test]
    fn display_skips_absent_and_renders_ranges() {
        let s = schema(&["LVEF", "EF-A2C", "EF-A4C"]);
        let result = process_report(
            "echo",
            "LVEF: 55 to 60\nEF-A4C: 52.5%",
            &s,
            &ThresholdRules::new(),
        );
        assert_eq!(result.display, "LVEF: 55-60; EF-A4C: 52.5");
        assert_eq!(result.verdict, RiskVerdict::LowRisk);
    }

    #[test]
    fn malformed_json_becomes_diagnostic() {
        let s = schema(&["LVEF"]);
        let result = process_report("bad", "{\"LVEF\": 3", &s, &ThresholdRules::new());
        assert_eq!(result.verdict, RiskVerdict::NotApplicable);
        assert!(result.is_failed());
        assert!(result.display.starts_with("Error: "));
        assert!(result.metrics.all_absent());
        assert_eq!(result.metrics.len(), 1);
    }

    #[test]
    fn brace_led_ocr_text_still_classifies() {
        let s = schema(&["LVEF"]);
        let result = process_report("ocr", "{Page 1 of 2}\nLVEF: 30%", &s, &ThresholdRules::new());
        assert_eq!(result.verdict, RiskVerdict::HighRisk);
        assert!(!result.is_failed());
        assert_eq!(result.display, "LVEF: 30");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["trigger"]["rule"]["condition"], "less than");
    }

    #[test]
    fn custom_metric_with_threshold() {
        let s = MetricSchema::with_custom(["BMI"]).unwrap();
        let rules: ThresholdRules =
            [("BMI".to_string(), ThresholdRule::between(18.0, 25.0))].into_iter().collect();
        let result = process_report("p", "LVEF: 60%\nBMI: 28", &s, &rules);
        assert_eq!(result.verdict, RiskVerdict::HighRisk);
        assert_eq!(result.trigger.unwrap().metric, "BMI");
    }

    #[test]
    fn batch_continues_past_failures() {
        let processor = ReportProcessor::new(schema(&["LVEF"]), ThresholdRules::new());
        let batch = processor.process_batch([
            ("a", "LVEF: 30%"),
            ("b", "{broken"),
            ("c", "LVEF: 60%"),
            ("d", ""),
        ]);
        assert_eq!(batch.results.len(), 4);
        assert_eq!(batch.results[1].report_id, "b");
        assert_eq!(batch.high_risk, 1);
        assert_eq!(batch.low_risk, 1);
        assert_eq!(batch.not_applicable, 2);
        assert_eq!(batch.failed, 1);
        assert_eq!(batch.batch_id.get_version_num(), 4);
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(json["batch_id"], batch.batch_id.to_string());
    }

    #[test]
    fn processor_from_config() {
        let config = ProcessorConfig::from_json_str(
            r#"{"custom_metrics": ["Heart Rate"],
                "thresholds": {"Heart Rate": {"condition": "greater than", "value": 100}}}"#,
        )
        .unwrap();
        let processor = ReportProcessor::from_config(&config).unwrap();
        assert_eq!(processor.schema().len(), 11);
        let result = processor.process("hr", "heart rate: 120");
        assert_eq!(result.verdict, RiskVerdict::HighRisk);
    }

    #[test]
    fn invalid_config_schema_is_error() {
        let config = ProcessorConfig {
            custom_metrics: vec!["EF-A2C".into()],
            ..Default::default()
        };
        assert!(matches!(
            ReportProcessor::from_config(&config),
            Err(ProcessingError::Config(ConfigError::Schema(_)))
        ));
    }

    #[test]
    fn report_id_strips_extension() {
        assert_eq!(report_id_from_path(Path::new("uploads/echo_0412.pdf")), "echo_0412");
        assert_eq!(report_id_from_path(Path::new("report")), "report");
    }

    #[test]
    fn result_serializes_for_presentation() {
        let s = schema(&["LVEF"]);
        let result = process_report("r", "LVEF: 55%", &s, &ThresholdRules::new());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["report_id"], "r");
        assert_eq!(json["verdict"], "Low Risk");
        assert_eq!(json["display"], "LVEF: 55");
        assert_eq!(json["metrics"]["LVEF"], 55.0);
        assert!(json.get("diagnostic").is_none());
    }

    #[test]
    fn processor_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReportProcessor>();
    }
}
