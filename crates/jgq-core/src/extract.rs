//! Pull structured content out of free-form model output.

use serde_json::Value;

use crate::error::{JgqError, JgqResult};
use crate::models::Role;

/// Extract JSON from a string that might be wrapped in markdown code blocks.
pub fn extract_json(text: &str) -> String {
    let trimmed = text.trim();

    if let Some(inner) = fenced_block(trimmed, "```json") {
        return inner;
    }
    if let Some(inner) = fenced_block(trimmed, "```") {
        return inner;
    }

    // First { to last } for a JSON object with surrounding chatter
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if end > start {
            return trimmed[start..=end].to_string();
        }
    }

    trimmed.to_string()
}

/// Read the string value of `key` from a single JSON object in `text`.
///
/// Anything else (not JSON, not an object, missing key, non-string value)
/// is a [`JgqError::MalformedResponse`] for `role`.
pub fn string_field(role: Role, text: &str, key: &str) -> JgqResult<String> {
    let json = extract_json(text);
    let value: Value = serde_json::from_str(&json)
        .map_err(|e| JgqError::malformed(role, format!("not valid JSON ({}): {}", e, snippet(text))))?;

    let object = value
        .as_object()
        .ok_or_else(|| JgqError::malformed(role, format!("expected a JSON object: {}", snippet(text))))?;

    match object.get(key) {
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(other) => Err(JgqError::malformed(
            role,
            format!("key '{}' is not a string: {}", key, other),
        )),
        None => Err(JgqError::malformed(
            role,
            format!("missing key '{}': {}", key, snippet(text)),
        )),
    }
}

/// Extract a Cypher statement from model output.
///
/// Strips markdown fences (with or without a `cypher` tag), a leading
/// `cypher` label line, and trailing semicolons.
pub fn extract_cypher(text: &str) -> String {
    let trimmed = text.trim();

    let body = fenced_block(trimmed, "```cypher")
        .or_else(|| fenced_block(trimmed, "```"))
        .unwrap_or_else(|| trimmed.to_string());

    let body = body.trim();
    let body = match body.split_once('\n') {
        Some((first, rest)) if first.trim().eq_ignore_ascii_case("cypher") => rest.trim(),
        _ => body,
    };

    body.trim_end_matches(';').trim().to_string()
}

fn fenced_block(text: &str, marker: &str) -> Option<String> {
    let start = text.find(marker)?;
    let after_marker = &text[start + marker.len()..];
    let end = after_marker.find("```")?;
    Some(after_marker[..end].trim().to_string())
}

fn snippet(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= 200 {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(200).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_variants() {
        assert_eq!(extract_json(r#"{"source": "structure"}"#), r#"{"source": "structure"}"#);
        assert_eq!(
            extract_json("```json\n{\"source\": \"none\"}\n```"),
            r#"{"source": "none"}"#
        );
        assert_eq!(
            extract_json("Sure! Here you go: {\"source\": \"javadoc\"} Hope it helps"),
            r#"{"source": "javadoc"}"#
        );
    }

    #[test]
    fn test_string_field() {
        let value = string_field(Role::Router, r#"{"source": " structure "}"#, "source").unwrap();
        assert_eq!(value, "structure");
    }

    #[test]
    fn test_string_field_missing_key() {
        let err = string_field(Role::Refiner, r#"{"question": "x"}"#, "refinement").unwrap_err();
        match err {
            JgqError::MalformedResponse { role, message } => {
                assert_eq!(role, Role::Refiner);
                assert!(message.contains("missing key 'refinement'"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_string_field_not_json() {
        let err = string_field(Role::Router, "structure", "source").unwrap_err();
        assert!(matches!(err, JgqError::MalformedResponse { .. }));
    }

    #[test]
    fn test_string_field_wrong_type() {
        let err = string_field(Role::Router, r#"{"source": 3}"#, "source").unwrap_err();
        assert!(err.to_string().contains("not a string"));
    }

    #[test]
    fn test_extract_cypher() {
        let plain = "MATCH (c:Class) RETURN c.name";
        assert_eq!(extract_cypher(plain), plain);
        assert_eq!(extract_cypher("```cypher\nMATCH (c:Class) RETURN c.name;\n```"), plain);
        assert_eq!(extract_cypher("Here it is:\n```\nMATCH (c:Class) RETURN c.name\n```"), plain);
        assert_eq!(extract_cypher("cypher\nMATCH (c:Class) RETURN c.name"), plain);
    }
}
