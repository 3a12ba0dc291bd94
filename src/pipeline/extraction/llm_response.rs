use serde_json::Value;

use super::ExtractionError;

/// True when the text is a JSON answer rather than "Key: Value" lines.
pub fn looks_like_json(text: &str) -> bool {
    text.trim_start().starts_with('{') || text.contains("```json")
}

/// Parse an LLM answer of the form `{"LVEF": "55%", "EF-A2C": null}` into
/// `(key, raw token)` pairs, optionally wrapped in a ```json fence.
///
/// Numbers are rendered back to text so every input shape goes through the
/// same value parser. Arrays and nested objects are skipped.
pub fn parse_llm_metric_json(response: &str) -> Result<Vec<(String, String)>, ExtractionError> {
    let json_str = extract_json_block(response)?;
    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| ExtractionError::JsonParsing(e.to_string()))?;

    let Value::Object(map) = value else {
        return Err(ExtractionError::MalformedResponse(
            "Top-level JSON value is not an object".into(),
        ));
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, v)| match v {
            Value::String(s) => Some((key, s)),
            Value::Number(n) => Some((key, n.to_string())),
            Value::Null => Some((key, String::new())),
            other => {
                tracing::debug!(key = %key, kind = json_kind(&other), "Skipping non-scalar metric value");
                None
            }
        })
        .collect())
}

/// Locate the JSON payload: the fenced block if present, otherwise the whole text.
fn extract_json_block(response: &str) -> Result<&str, ExtractionError> {
    let Some(fence_start) = response.find("```json") else {
        return Ok(response.trim());
    };
    let content_start = fence_start + "```json".len();
    let content_end = response[content_start..]
        .find("```")
        .ok_or_else(|| ExtractionError::MalformedResponse("Unclosed JSON block".into()))?;
    Ok(response[content_start..content_start + content_end].trim())
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::Bool(_) => "bool",
        _ => "scalar",
    }
}
