use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::llm_response::{looks_like_json, parse_llm_metric_json};
use super::sanitize::{sanitize_report_text, strip_control_chars};
use super::sections::order_by_service_date;
use super::value::parse_metric_value;
use super::ExtractionError;
use crate::models::{MetricReadings, MetricSchema};

/// Echo view qualifiers, in canonical spelling.
pub const VIEW_QUALIFIERS: &[&str] = &[
    "A2C", "A4C", "Biplane", "PLAX", "PSAX", "Subcostal", "Other", "Global", "Mmode",
];

/// "LVEF" / "EF", optionally followed by a view qualifier ("ef a2c", "EF_Biplane").
static METRIC_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(LVEF|EF)(?:\s*[-_ ]\s*|\s*)(A2C|A4C|Biplane|PLAX|PSAX|Subcostal|Other|Global|M-?mode)?$",
    )
    .unwrap()
});

/// The layouts upstream producers emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputShape {
    /// "Key: Value" per line (OCR text, LLM prose answers).
    Lines,
    /// "Metric,Value" rows, optionally with a header row.
    Table,
    /// A JSON object, optionally fenced in ```json.
    LlmJson,
}

/// Decide which layout a (sanitized) report uses.
pub fn detect_shape(text: &str) -> InputShape {
    if looks_like_json(text) {
        InputShape::LlmJson
    } else {
        detect_text_shape(text)
    }
}

fn detect_text_shape(text: &str) -> InputShape {
    if has_table_header(text) {
        return InputShape::Table;
    }
    let has_colon = text.lines().any(|l| l.contains(':'));
    let has_comma = text.lines().any(|l| l.contains(','));
    if !has_colon && has_comma {
        InputShape::Table
    } else {
        InputShape::Lines
    }
}

/// Extract every schema metric from one report.
///
/// The returned readings always hold exactly the schema's names; metrics not
/// found stay `Absent`. Repeated keys resolve to the last occurrence.
/// Malformed lines are skipped. Text that looks like JSON but does not parse
/// is read as lines or table rows instead; it is an error only when that
/// yields no recognizable metric either.
pub fn extract_metrics(
    text: &str,
    schema: &MetricSchema,
) -> Result<MetricReadings, ExtractionError> {
    let mut readings = MetricReadings::absent(schema.names());
    let normalized = sanitize_report_text(text);
    if normalized.is_empty() {
        return Ok(readings);
    }

    // JSON is read before typography folding so quotes inside strings survive
    let json_text = strip_control_chars(text);
    let text_shape = detect_text_shape(&normalized);
    let (shape, pairs) = if looks_like_json(&json_text) {
        match parse_llm_metric_json(&json_text) {
            Ok(pairs) => (InputShape::LlmJson, pairs),
            Err(e) => {
                let pairs = split_text(&normalized, text_shape);
                if !pairs.iter().any(|(key, _)| resolve_metric_key(key, schema).is_some()) {
                    return Err(e);
                }
                tracing::warn!(
                    error = %e,
                    shape = ?text_shape,
                    "JSON answer did not parse, reading report as text"
                );
                (text_shape, pairs)
            }
        }
    } else {
        (text_shape, split_text(&normalized, text_shape))
    };

    let mut recorded = 0usize;
    for (key, raw) in &pairs {
        match resolve_metric_key(key, schema) {
            Some(name) => {
                readings.set(name, parse_metric_value(raw));
                recorded += 1;
            }
            None => tracing::trace!(key = %key, "Ignoring unrecognized metric key"),
        }
    }

    tracing::debug!(
        shape = ?shape,
        candidates = pairs.len(),
        recorded,
        "Extracted metrics"
    );
    Ok(readings)
}

fn split_text(normalized: &str, shape: InputShape) -> Vec<(String, String)> {
    let ordered = order_by_service_date(normalized);
    match shape {
        InputShape::Table => split_table_rows(&ordered),
        InputShape::Lines | InputShape::LlmJson => split_key_values(&ordered),
    }
}

/// Map a raw key to its canonical schema name.
///
/// Direct schema hits win (exact case first); otherwise EF-style spellings are
/// canonicalized ("ef a2c" → "EF-A2C") and kept only if the schema has them.
pub fn resolve_metric_key<'s>(key: &str, schema: &'s MetricSchema) -> Option<&'s str> {
    let key = clean_key(key);
    if key.is_empty() {
        return None;
    }
    if let Some(name) = schema.resolve(&key) {
        return Some(name);
    }
    canonical_ef_name(&key).and_then(|canonical| schema.resolve(&canonical))
}

/// Canonical spelling of an EF-style metric key, if it is one.
pub fn canonical_ef_name(key: &str) -> Option<String> {
    let caps = METRIC_NAME_PATTERN.captures(key.trim())?;
    let base = caps[1].to_uppercase();
    match caps.get(2) {
        None => Some(base),
        Some(q) => {
            let q = q.as_str().replace('-', "");
            VIEW_QUALIFIERS
                .iter()
                .find(|v| v.eq_ignore_ascii_case(&q))
                .map(|v| format!("{base}-{v}"))
        }
    }
}

/// Strip list bullets, markdown emphasis and quotes from a key.
fn clean_key(raw: &str) -> String {
    raw.replace("**", "")
        .trim()
        .trim_start_matches(['-', '*', '\u{2022}'])
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

fn has_table_header(text: &str) -> bool {
    text.lines()
        .find(|l| !l.trim().is_empty())
        .and_then(|first| first.split(',').next())
        .is_some_and(|field| clean_key(field).eq_ignore_ascii_case("metric"))
}

/// "Key: Value" lines, split on the first colon. A line without a colon is
/// read as a "Key,Value" row; lines with neither are skipped.
fn split_key_values(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| line.split_once(':').or_else(|| line.split_once(',')))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

/// "Metric,Value" rows, split on the first comma, header row skipped.
fn split_table_rows(text: &str) -> Vec<(String, String)> {
    let skip = usize::from(has_table_header(text));
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .skip(skip)
        .filter_map(|row| row.split_once(','))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}
