/// Normalize line endings and strip control characters other than newline
/// and tab. Typography is left intact, so JSON string content survives.
pub fn strip_control_chars(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .replace('\r', "\n")
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect()
}

/// Normalize OCR or LLM report text before line and table extraction.
///
/// Strips control characters, folds typographic dashes and quotes to ASCII
/// (so "35–45" reads as a range), trims every line and drops blank ones.
pub fn sanitize_report_text(raw: &str) -> String {
    strip_control_chars(raw)
        .chars()
        .map(fold_typography)
        .collect::<String>()
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn fold_typography(c: char) -> char {
    match c {
        '\u{2010}' // Hyphen
        | '\u{2011}' // Non-breaking hyphen
        | '\u{2012}' // Figure dash
        | '\u{2013}' // En-dash
        | '\u{2014}' // Em-dash
        | '\u{2212}' // Minus sign
        => '-',
        '\u{2018}' | '\u{2019}' => '\'',
        '\u{201C}' | '\u{201D}' => '"',
        '\u{00A0}' => ' ',
        other => other,
    }
}
