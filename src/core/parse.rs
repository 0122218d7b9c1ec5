//! Tolerant JSON extraction from model output
//!
//! Model responses arrive wrapped in prose or markdown code fences. Strip the
//! fences, take the first balanced `{...}` span (string- and escape-aware, so
//! braces inside string values do not end the span early), and strict-parse
//! it. Any failure yields None; callers keep their prior state.

use serde_json::{Map, Value};

/// Best-effort extraction of a JSON object from unstructured model output
pub fn extract_json_object(raw: &str) -> Option<Map<String, Value>> {
    let cleaned = strip_code_fences(raw);
    let span = balanced_object_span(&cleaned)?;

    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "")
}

/// First `{` through its matching `}`, tracking string literals and escapes
fn balanced_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fenced_json_with_prose() {
        let raw = "Sure! Here is the analysis you asked for:\n```json\n{\"genre\":\"comedy\",\"mood\":\"light\",\"similar_content_suggestions\":[\"X\"],\"key_elements\":[\"Y\"],\"audience_options\":[\"General\",\"Kids\"]}\n```\nLet me know if you need more.";
        let map = extract_json_object(raw).unwrap();

        assert_eq!(map.len(), 5);
        assert_eq!(map["genre"], json!("comedy"));
        assert_eq!(map["similar_content_suggestions"], json!(["X"]));
        assert_eq!(map["audience_options"], json!(["General", "Kids"]));
    }

    #[test]
    fn test_plain_object() {
        let map = extract_json_object(r#"{"video_type": "lecture"}"#).unwrap();
        assert_eq!(map["video_type"], json!("lecture"));
    }

    #[test]
    fn test_nested_objects() {
        let map = extract_json_object(r#"{"outer": {"inner": 1}, "k": 2}"#).unwrap();
        assert_eq!(map["outer"], json!({"inner": 1}));
        assert_eq!(map["k"], json!(2));
    }

    #[test]
    fn test_braces_inside_string_values() {
        let raw = r#"{"custom_prompt": "use {placeholders} like } and { freely", "n": 1}"#;
        let map = extract_json_object(raw).unwrap();
        assert_eq!(map["custom_prompt"], json!("use {placeholders} like } and { freely"));
        assert_eq!(map["n"], json!(1));
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let raw = r#"{"mood": "she said \"hi\" {sic}"}"#;
        let map = extract_json_object(raw).unwrap();
        assert_eq!(map["mood"], json!("she said \"hi\" {sic}"));
    }

    #[test]
    fn test_no_braces_returns_none() {
        assert!(extract_json_object("no json in here").is_none());
    }

    #[test]
    fn test_unbalanced_returns_none() {
        assert!(extract_json_object(r#"{"genre": "comedy""#).is_none());
    }

    #[test]
    fn test_invalid_json_in_span_returns_none() {
        assert!(extract_json_object("{not json at all}").is_none());
    }

    #[test]
    fn test_non_object_json_returns_none() {
        assert!(extract_json_object("[1, 2, 3]").is_none());
    }
}
