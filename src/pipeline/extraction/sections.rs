//! Service-date ordering for multi-visit reports.
//!
//! A report may carry several "Date of Service" blocks in arbitrary order.
//! Extraction is last-occurrence-wins, so blocks are re-emitted oldest first
//! and the latest-dated observation of each metric prevails.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static SERVICE_DATE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:date\s+of\s+service|DOS\b)\s*[:,\-]?\s*(.*?)\s*$").unwrap()
});

/// Accepted date layouts, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// One "Date of Service" block.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSection {
    /// `None` when the header carried no recognizable date.
    pub date: Option<NaiveDate>,
    pub lines: Vec<String>,
}

/// Parse a service date in any of the accepted layouts.
pub fn parse_service_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim().trim_end_matches('.');
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Split text into the preamble (lines before the first header) and sections.
pub fn split_service_sections(text: &str) -> (Vec<String>, Vec<ServiceSection>) {
    let mut preamble = Vec::new();
    let mut sections: Vec<ServiceSection> = Vec::new();

    for line in text.lines() {
        if let Some(caps) = SERVICE_DATE_HEADER.captures(line) {
            let (date, carried) = split_header_remainder(&caps[1]);
            sections.push(ServiceSection {
                date,
                lines: carried.map(str::to_string).into_iter().collect(),
            });
            continue;
        }
        match sections.last_mut() {
            Some(section) => section.lines.push(line.to_string()),
            None => preamble.push(line.to_string()),
        }
    }

    (preamble, sections)
}

/// Date and same-line data of a header remainder ("2024-01-15, LVEF: 45%").
/// A remainder that holds no leading date is kept whole as content.
fn split_header_remainder(rest: &str) -> (Option<NaiveDate>, Option<&str>) {
    let rest = rest.trim();
    if rest.is_empty() {
        return (None, None);
    }
    if let Some(date) = parse_service_date(rest) {
        return (Some(date), None);
    }
    for (i, _) in rest.match_indices([',', ';']) {
        if let Some(date) = parse_service_date(&rest[..i]) {
            let tail = rest[i + 1..].trim();
            return (Some(date), (!tail.is_empty()).then_some(tail));
        }
    }
    (None, Some(rest))
}

/// Re-emit the text with service sections sorted by date, oldest first.
///
/// Undated sections sort before dated ones; ties keep document order.
/// Header lines are dropped, keeping any data they carried after the date.
/// Text without a header is returned unchanged.
pub fn order_by_service_date(text: &str) -> String {
    let (preamble, mut sections) = split_service_sections(text);
    if sections.is_empty() {
        return text.to_string();
    }

    if sections.len() > 1 {
        // Option<NaiveDate> orders None first
        sections.sort_by_key(|s| s.date);
        tracing::debug!(
            sections = sections.len(),
            latest = ?sections.last().and_then(|s| s.date),
            "Ordered report by date of service"
        );
    }

    preamble
        .into_iter()
        .chain(sections.into_iter().flat_map(|s| s.lines))
        .collect::<Vec<_>>()
        .join("\n")
}
