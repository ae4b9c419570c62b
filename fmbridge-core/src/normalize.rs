//! Normalization of raw model replies into structured data.
//!
//! Only the dynamic-schema path goes through here. Capability failures
//! short-circuit before normalization; parse failures never escalate to
//! errors but degrade into a warning-carrying result, so the caller always
//! gets usable text back.

use serde_json::{Map, Value};

use crate::types::Extraction;

/// Warning attached when the reply could not be parsed as a JSON object.
pub const PARSE_WARNING: &str = "Could not parse JSON";

/// Key under which the unparsed reply is preserved on degradation.
pub const RAW_TEXT_KEY: &str = "rawText";

/// Convert a raw text reply into structured data, or degrade gracefully.
///
/// Trims whitespace, strips a leading/trailing fenced-code-block marker if
/// one wraps the whole reply, then parses the remainder as JSON. Anything
/// other than a top-level object (malformed syntax, truncation, a bare
/// array) falls back to `{"rawText": cleaned}` with [`PARSE_WARNING`].
pub fn normalize_reply(raw: &str) -> Extraction {
    let cleaned = strip_fences(raw.trim());

    match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Object(data)) => Extraction {
            data,
            warning: None,
        },
        _ => {
            let mut data = Map::new();
            data.insert(RAW_TEXT_KEY.to_string(), Value::String(cleaned.to_string()));
            Extraction {
                data,
                warning: Some(PARSE_WARNING.to_string()),
            }
        }
    }
}

/// Strip wrapping ``` fences at the very start/end of trimmed text.
///
/// Only a fence line that opens the reply (with an optional language tag
/// such as `json`) and a closing fence at the end are removed; fences in
/// the middle of the reply are left alone.
fn strip_fences(text: &str) -> &str {
    let mut t = text;

    if let Some(rest) = t.strip_prefix("```") {
        // Drop the remainder of the fence line, language tag included.
        t = match rest.find('\n') {
            Some(i) => &rest[i + 1..],
            None => "",
        };
    }

    let trimmed = t.trim_end();
    if let Some(rest) = trimmed.strip_suffix("```") {
        t = rest;
    }

    t.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn well_formed_object_parses_cleanly() {
        let extraction = normalize_reply(r#"{"rating": 8, "recommends": true}"#);
        assert!(extraction.is_clean());
        assert_eq!(extraction.data.get("rating"), Some(&json!(8)));
        assert_eq!(extraction.data.get("recommends"), Some(&json!(true)));
    }

    #[test]
    fn json_fences_are_stripped_before_parsing() {
        let raw = "```json\n{\"rating\": 8}\n```";
        let extraction = normalize_reply(raw);
        assert!(extraction.is_clean());
        assert_eq!(extraction.data.get("rating"), Some(&json!(8)));
    }

    #[test]
    fn bare_fences_are_stripped_before_parsing() {
        let raw = "```\n{\"ok\": true}\n```";
        let extraction = normalize_reply(raw);
        assert!(extraction.is_clean());
        assert_eq!(extraction.data.get("ok"), Some(&json!(true)));
    }

    #[test]
    fn prose_falls_back_to_raw_text() {
        let raw = "I think the rating is about 8 out of 10";
        let extraction = normalize_reply(raw);
        assert_eq!(extraction.warning.as_deref(), Some(PARSE_WARNING));
        assert_eq!(extraction.data.get(RAW_TEXT_KEY), Some(&json!(raw)));
        assert_eq!(extraction.data.len(), 1);
    }

    #[test]
    fn top_level_array_is_treated_as_non_mapping() {
        let raw = r#"["a","b","c"]"#;
        let extraction = normalize_reply(raw);
        assert_eq!(extraction.warning.as_deref(), Some(PARSE_WARNING));
        assert_eq!(extraction.data.get(RAW_TEXT_KEY), Some(&json!(raw)));
    }

    #[test]
    fn empty_reply_degrades_instead_of_crashing() {
        let extraction = normalize_reply("   \n  ");
        assert_eq!(extraction.warning.as_deref(), Some(PARSE_WARNING));
        assert_eq!(extraction.data.get(RAW_TEXT_KEY), Some(&json!("")));
    }

    #[test]
    fn truncated_json_preserves_the_raw_text() {
        let raw = r#"{"summary": "the article says"#;
        let extraction = normalize_reply(raw);
        assert_eq!(extraction.warning.as_deref(), Some(PARSE_WARNING));
        assert_eq!(extraction.data.get(RAW_TEXT_KEY), Some(&json!(raw)));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let extraction = normalize_reply("  \n {\"x\": 1} \n ");
        assert!(extraction.is_clean());
        assert_eq!(extraction.data.get("x"), Some(&json!(1)));
    }

    #[test]
    fn scalar_top_level_degrades() {
        let extraction = normalize_reply("42");
        assert_eq!(extraction.warning.as_deref(), Some(PARSE_WARNING));
    }

    #[test]
    fn interior_fences_are_left_alone() {
        let raw = r#"{"snippet": "use ``` for code"}"#;
        let extraction = normalize_reply(raw);
        assert!(extraction.is_clean());
    }
}
