//! hfscan - EF extraction and heart-failure risk triage over report text.
//!
//! Input files are the text produced upstream by OCR or an LLM, one report
//! per file. `-` reads a single report from stdin.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use hfscan_lib::pipeline::report_id_from_path;
use hfscan_lib::pipeline::risk::ThresholdSettings;
use hfscan_lib::{MetricSchema, ProcessorConfig, ReportProcessor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Extract ejection-fraction metrics from report text and classify risk.
#[derive(Parser, Debug)]
#[command(name = "hfscan", version)]
#[command(after_help = "\
Examples:
  hfscan reports/*.txt                        Classify OCR text dumps
  hfscan -m BMI --thresholds t.json echo.txt  Add a custom metric with thresholds
  cat answer.txt | hfscan --format json -     Read one LLM answer from stdin")]
struct Cli {
    /// Report text files (`-` for stdin)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Processor config (custom metrics + thresholds).
    /// Defaults to <data dir>/hfscan/config.json when present.
    #[arg(long, env = "HFSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Threshold settings document; replaces the config's thresholds
    #[arg(long)]
    thresholds: Option<PathBuf>,

    /// Extra metric name to extract (repeatable)
    #[arg(short = 'm', long = "metric")]
    metrics: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Log level (error, warn, info, debug, trace); RUST_LOG applies when unset
    #[arg(long, value_parser = ["error", "warn", "info", "debug", "trace"])]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    hfscan_lib::init_tracing(cli.log_level.as_deref());

    let config = load_config(&cli)?;
    let processor = ReportProcessor::from_config(&config).context("Invalid configuration")?;

    let reports = read_reports(&cli.files);
    let batch = processor.process_batch(reports);

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&batch)?);
        }
        OutputFormat::Text => {
            for result in &batch.results {
                println!("{}\t{}\t{}", result.report_id, result.verdict, result.display);
            }
            eprintln!(
                "{} reports: {} high risk, {} low risk, {} n/a ({} failed)",
                batch.results.len(),
                batch.high_risk,
                batch.low_risk,
                batch.not_applicable,
                batch.failed
            );
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<ProcessorConfig> {
    let mut config = match &cli.config {
        Some(path) => ProcessorConfig::load(path)
            .with_context(|| format!("Loading config {}", path.display()))?,
        None => {
            let default = ProcessorConfig::default_path();
            if default.is_file() {
                tracing::debug!(path = %default.display(), "Using default config");
                ProcessorConfig::load(&default)?
            } else {
                ProcessorConfig::default()
            }
        }
    };

    if let Some(path) = &cli.thresholds {
        config.thresholds = ThresholdSettings::load(path)
            .with_context(|| format!("Loading thresholds {}", path.display()))?;
    }
    merge_custom_metrics(&mut config, &cli.metrics);
    Ok(config)
}

/// Append `-m` metrics, skipping names the schema would already carry.
fn merge_custom_metrics(config: &mut ProcessorConfig, metrics: &[String]) {
    let defaults = MetricSchema::default();
    for metric in metrics {
        let name = metric.trim();
        if defaults.contains(name) || config.custom_metrics.iter().any(|m| m.trim() == name) {
            tracing::debug!(metric = name, "Metric already in schema");
            continue;
        }
        config.custom_metrics.push(name.to_string());
    }
}

/// Read every input. Unreadable files are logged and skipped so the rest of
/// the batch still runs.
fn read_reports(files: &[PathBuf]) -> Vec<(String, String)> {
    files
        .iter()
        .filter_map(|path| match read_report(path) {
            Ok(text) => Some((report_id(path), text)),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Skipping unreadable report");
                None
            }
        })
        .collect()
}

fn read_report(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn report_id(path: &Path) -> String {
    if path.as_os_str() == "-" {
        "stdin".to_string()
    } else {
        report_id_from_path(path)
    }
}
