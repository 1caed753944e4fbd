//! Structured-response helpers
//!
//! Generators are instructed to answer with a raw JSON object, but many
//! models wrap their output in a markdown code fence anyway. The fence is
//! stripped before the structural parse; anything that still fails to parse
//! is a malformed response.

use serde::de::DeserializeOwned;

use crate::LlmError;

/// Strip an optional markdown code fence (```json ... ``` or ``` ... ```)
/// from a generator response.
pub fn strip_code_fence(text: &str) -> &str {
    let mut t = text.trim();
    if let Some(rest) = t.strip_prefix("```json") {
        t = rest;
    } else if let Some(rest) = t.strip_prefix("```") {
        t = rest;
    }
    if let Some(rest) = t.strip_suffix("```") {
        t = rest;
    }
    t.trim()
}

/// Parse a (possibly fenced) generator response into a typed value.
pub fn parse_fenced_json<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| LlmError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        assert_eq!(
            strip_code_fence("```json\n{\"a\": 1}\n```"),
            "{\"a\": 1}"
        );
    }

    #[test]
    fn strips_bare_fence() {
        assert_eq!(strip_code_fence("```\n[1, 2]\n```"), "[1, 2]");
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn parses_fenced_object() {
        #[derive(serde::Deserialize)]
        struct Out {
            question: String,
        }
        let out: Out =
            parse_fenced_json("```json\n{\"question\": \"Why?\"}\n```").unwrap();
        assert_eq!(out.question, "Why?");
    }

    #[test]
    fn malformed_maps_to_invalid_response() {
        let err = parse_fenced_json::<serde_json::Value>("not json at all")
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }
}
