//! Pull a JSON payload out of free-form model output.
//!
//! Models often wrap JSON in markdown fences or add a sentence before it.
//! Extraction strips fences, then falls back to the outermost bracket span
//! matching the expected shape.

use serde_json::Value;

use crate::{Error, ExpectedShape, Result};

/// Extract a payload of the given shape from raw response text.
///
/// [`ExpectedShape::Text`] returns the trimmed text as a JSON string.
pub fn extract_payload(raw: &str, shape: ExpectedShape) -> Result<Value> {
    let text = strip_fences(raw.trim());

    let (open, close) = match shape {
        ExpectedShape::Text => {
            if text.is_empty() {
                return Err(Error::MalformedPayload("empty response".to_string()));
            }
            return Ok(Value::String(text.to_string()));
        }
        ExpectedShape::Object => ('{', '}'),
        ExpectedShape::Array => ('[', ']'),
    };

    if let Ok(value) = serde_json::from_str::<Value>(text)
        && matches_shape(&value, shape)
    {
        return Ok(value);
    }

    let start = text.find(open);
    let end = text.rfind(close);
    match (start, end) {
        (Some(start), Some(end)) if start < end => {
            let value: Value = serde_json::from_str(&text[start..=end])?;
            if matches_shape(&value, shape) {
                Ok(value)
            } else {
                Err(Error::MalformedPayload(format!(
                    "expected {shape:?}, found {}",
                    kind(&value)
                )))
            }
        }
        _ => Err(Error::MalformedPayload(format!(
            "no {shape:?} payload in response"
        ))),
    }
}

fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag on the opening fence line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn matches_shape(value: &Value, shape: ExpectedShape) -> bool {
    match shape {
        ExpectedShape::Object => value.is_object(),
        ExpectedShape::Array => value.is_array(),
        ExpectedShape::Text => true,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_bare_json_array() {
        let value = extract_payload(r#"[{"type": "Burn"}]"#, ExpectedShape::Array).unwrap();
        assert_eq!(value, json!([{"type": "Burn"}]));
    }

    #[test]
    fn strips_markdown_fences() {
        let raw = "```json\n{\"growth_rate\": {\"p10\": 20}}\n```";
        let value = extract_payload(raw, ExpectedShape::Object).unwrap();
        assert_eq!(value["growth_rate"]["p10"], 20);
    }

    #[test]
    fn finds_payload_inside_prose() {
        let raw = "Here are the risks you asked for:\n[{\"type\": \"Churn\"}]\nLet me know.";
        let value = extract_payload(raw, ExpectedShape::Array).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn rejects_wrong_shape() {
        let err = extract_payload(r#"{"a": 1}"#, ExpectedShape::Array).unwrap_err();
        assert!(err.to_string().contains("no Array payload"));
    }

    #[test]
    fn rejects_garbage_between_brackets() {
        let err = extract_payload("{ not json }", ExpectedShape::Object).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn text_shape_returns_trimmed_string() {
        let value = extract_payload("  Deal note body  ", ExpectedShape::Text).unwrap();
        assert_eq!(value, Value::String("Deal note body".to_string()));
    }

    #[test]
    fn empty_text_is_malformed() {
        assert!(extract_payload("   ", ExpectedShape::Text).is_err());
    }
}
