//! Parsing of the structured classification and location outputs.
//!
//! Both completions are asked for a bare JSON object. Anything that does not
//! parse as one is reported as [`ChatError::StructuredOutput`]; callers treat
//! that the same as a negative answer.

use serde_json::Value;

use crate::error::ChatError;

/// Outcome of the visual-need classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisualNeed {
    pub needs_image: bool,
    pub search_query: Option<String>,
}

impl VisualNeed {
    /// The "no image" answer.
    pub fn none() -> Self {
        Self::default()
    }

    /// Search phrase to use, when the classifier asked for an image and gave
    /// a non-empty query.
    pub fn query(&self) -> Option<&str> {
        if !self.needs_image {
            return None;
        }
        self.search_query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
    }
}

fn parse_object(text: &str) -> Result<serde_json::Map<String, Value>, ChatError> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ChatError::StructuredOutput(format!(
            "expected object, got {}",
            other
        ))),
        Err(e) => Err(ChatError::StructuredOutput(e.to_string())),
    }
}

/// Parse `{"needsImage": bool, "searchQuery": string|null, "reasoning": string}`.
///
/// `needsImage` must be a boolean. A `searchQuery` that is not a string is
/// treated as absent; `reasoning` is ignored.
pub fn parse_classification(text: &str) -> Result<VisualNeed, ChatError> {
    let map = parse_object(text)?;

    let needs_image = map
        .get("needsImage")
        .and_then(Value::as_bool)
        .ok_or_else(|| ChatError::StructuredOutput("needsImage missing or not a bool".into()))?;

    let search_query = map
        .get("searchQuery")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(VisualNeed {
        needs_image,
        search_query,
    })
}

/// Parse `{"location": string|null}` into a non-empty caption.
pub fn parse_location(text: &str) -> Result<Option<String>, ChatError> {
    let map = parse_object(text)?;
    Ok(map
        .get("location")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_classification() {
        let need = parse_classification(
            r#"{"needsImage": true, "searchQuery": "chocolate hills bohol", "reasoning": "a place"}"#,
        )
        .unwrap();
        assert!(need.needs_image);
        assert_eq!(need.query(), Some("chocolate hills bohol"));
    }

    #[test]
    fn test_parse_negative_classification() {
        let need = parse_classification(
            r#"{"needsImage": false, "searchQuery": null, "reasoning": "abstract"}"#,
        )
        .unwrap();
        assert_eq!(need, VisualNeed::none());
        assert_eq!(need.query(), None);
    }

    #[test]
    fn test_blank_query_is_not_usable() {
        let need = parse_classification(r#"{"needsImage": true, "searchQuery": "  "}"#).unwrap();
        assert!(need.needs_image);
        assert_eq!(need.query(), None);

        let need = parse_classification(r#"{"needsImage": true, "searchQuery": 42}"#).unwrap();
        assert_eq!(need.query(), None);
    }

    #[test]
    fn test_malformed_classification_is_error() {
        for text in [
            "Sure! Here is the JSON: {\"needsImage\": true}",
            "```json\n{\"needsImage\": true}\n```",
            "[true]",
            r#"{"needsImage": "yes", "searchQuery": "x"}"#,
            r#"{"searchQuery": "x"}"#,
            "",
        ] {
            let err = parse_classification(text).unwrap_err();
            assert!(matches!(err, ChatError::StructuredOutput(_)), "{}", text);
        }
    }

    #[test]
    fn test_parse_location() {
        assert_eq!(
            parse_location(r#"{"location": "Chocolate Hills, Carmen, Bohol, Philippines"}"#)
                .unwrap()
                .as_deref(),
            Some("Chocolate Hills, Carmen, Bohol, Philippines")
        );
        assert_eq!(parse_location(r#"{"location": null}"#).unwrap(), None);
        assert_eq!(parse_location(r#"{"location": ""}"#).unwrap(), None);
        assert_eq!(parse_location(r#"  {"location": " Vigan "}  "#).unwrap().as_deref(), Some("Vigan"));
        assert!(parse_location("Chocolate Hills").is_err());
    }
}
