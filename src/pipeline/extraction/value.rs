use std::sync::LazyLock;

use regex::Regex;

use crate::models::MetricValue;

/// Substrings meaning "no value reported". Matched case-insensitively.
const NEGATIVE_MARKERS: &[&str] = &["not found", "n/a", "no", "na"];

/// Two sides around a hyphen, dash or the word "to". The right side may be
/// empty ("45-"). The leading `\S` keeps a bare negative number ("-5") from
/// reading as a range.
static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\S.*?)\s*(?:-|\u{2013}|\u{2014}|\bto\b)\s*(.*)$").unwrap()
});

/// Plain integer or decimal. No exponents, no locale separators.
static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)$").unwrap());

/// Parse one raw metric token ("55%", "35 to 45", "No EF found") into a value.
///
/// Never fails: anything unparseable degrades to [`MetricValue::Absent`].
pub fn parse_metric_value(raw: &str) -> MetricValue {
    let token = clean_token(raw);
    if token.is_empty() || has_negative_marker(&token) {
        return MetricValue::Absent;
    }

    if let Some(caps) = RANGE_PATTERN.captures(&token) {
        let low = parse_number(&caps[1]);
        let high = parse_number(&caps[2]);
        match (low, high) {
            (Some(a), Some(b)) => return MetricValue::range(a, b),
            (Some(v), None) | (None, Some(v)) => return MetricValue::Scalar(v),
            // "-5" style tokens fall through to the single-number parse
            (None, None) => {}
        }
    }

    match parse_number(&token) {
        Some(v) => MetricValue::Scalar(v),
        None => {
            tracing::trace!(token = %token, "Metric token did not parse");
            MetricValue::Absent
        }
    }
}

/// Remove percent signs, surrounding quotes and whitespace.
fn clean_token(raw: &str) -> String {
    raw.replace('%', "")
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

fn has_negative_marker(token: &str) -> bool {
    let lower = token.to_lowercase();
    NEGATIVE_MARKERS.iter().any(|m| lower.contains(m))
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if !NUMBER_PATTERN.is_match(s) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}
