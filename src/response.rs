//! Normalization of the `translate_a/single` payload into [`TranslationResult`].
//!
//! Positions used in the payload:
//!
//! - `[0][i][0]`: translated fragments, concatenated in order
//! - `[2]`: nominal source language
//! - `[7][0]`: source suggestion with `<b><i>..</i></b>` markup, `[7][5]` auto-corrected flag
//! - `[8][0][0]`: alternate detected source language

use crate::error::MalformedResponse;
use crate::payload;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized translation result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub text: String,
    pub detected_source: DetectedSource,
    pub source_suggestion: SourceSuggestion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_payload: Option<String>,
}

/// Source language as inferred by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedSource {
    pub iso: String,
    /// The service's alternate detection disagreed with the nominal field.
    pub was_corrected: bool,
}

/// Spelling suggestion for the input text, corrected spans wrapped in `[` `]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSuggestion {
    pub value: String,
    pub auto_corrected: bool,
    pub was_questioned: bool,
}

/// Parse a raw response body.
///
/// With `raw`, the untouched body is attached to the result and, on failure,
/// to the returned error.
pub fn parse_response(body: &str, raw: bool) -> Result<TranslationResult, MalformedResponse> {
    let raw_payload = raw.then(|| body.to_string());

    let parsed = payload::parse(body)
        .map_err(|e| MalformedResponse::new(e.to_string()).with_raw(raw_payload.clone()))?;

    let fragments = parsed
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            MalformedResponse::new("Invalid response format").with_raw(raw_payload.clone())
        })?;

    Ok(TranslationResult {
        text: translated_text(fragments),
        detected_source: detected_source(&parsed),
        source_suggestion: source_suggestion(&parsed),
        raw_payload,
    })
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn translated_text(fragments: &[Value]) -> String {
    fragments
        .iter()
        .filter_map(|entry| non_empty_str(entry.get(0)))
        .collect()
}

fn detected_source(parsed: &Value) -> DetectedSource {
    let nominal = non_empty_str(parsed.get(2));
    let alternate = non_empty_str(parsed.pointer("/8/0/0"));

    match (nominal, alternate) {
        (Some(nominal), Some(alternate)) if nominal != alternate => DetectedSource {
            iso: alternate.to_string(),
            was_corrected: true,
        },
        (Some(nominal), _) => DetectedSource {
            iso: nominal.to_string(),
            was_corrected: false,
        },
        (None, _) => DetectedSource::default(),
    }
}

fn source_suggestion(parsed: &Value) -> SourceSuggestion {
    let Some(marked) = non_empty_str(parsed.pointer("/7/0")) else {
        return SourceSuggestion::default();
    };

    let auto_corrected = parsed.pointer("/7/5") == Some(&Value::Bool(true));

    SourceSuggestion {
        value: marked.replace("<b><i>", "[").replace("</i></b>", "]"),
        auto_corrected,
        was_questioned: !auto_corrected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Text Tests ====================

    #[test]
    fn test_parse_identity_detection() {
        let body = r#"[[["Hola","Hello",null,null,1]],null,"en",null,null,null,null,null,[["en"],null,[1.0],["en"]]]"#;
        let result = parse_response(body, false).unwrap();

        assert_eq!(result.text, "Hola");
        assert_eq!(result.detected_source.iso, "en");
        assert!(!result.detected_source.was_corrected);
        assert_eq!(result.source_suggestion, SourceSuggestion::default());
        assert_eq!(result.raw_payload, None);
    }

    #[test]
    fn test_parse_concatenates_fragments() {
        let body = r#"[[["Hola. ","Hello. ",null,null,3],["¿Cómo estás?","How are you?",null,null,3],[null,null,"Óla"]],null,"en"]"#;
        let result = parse_response(body, false).unwrap();

        assert_eq!(result.text, "Hola. ¿Cómo estás?");
    }

    #[test]
    fn test_parse_skips_entries_without_first_element() {
        let body = r#"[[["a"],[],null,[,"x"],["b"]],,"en"]"#;
        let result = parse_response(body, false).unwrap();

        assert_eq!(result.text, "ab");
    }

    #[test]
    fn test_parse_empty_fragment_array_is_empty_text() {
        let result = parse_response(r#"[[],null,"fr"]"#, false).unwrap();
        assert_eq!(result.text, "");
        assert_eq!(result.detected_source.iso, "fr");
    }

    // ==================== Detected Source Tests ====================

    #[test]
    fn test_parse_alternate_detection_wins_when_different() {
        let body = r#"[[["Hello","Hola"]],,"en",,,,,,[["es"]]]"#;
        let result = parse_response(body, false).unwrap();

        assert!(result.detected_source.was_corrected);
        assert_eq!(result.detected_source.iso, "es");
    }

    #[test]
    fn test_parse_nominal_only() {
        let body = r#"[[["Bonjour","Hello"]],null,"en"]"#;
        let result = parse_response(body, false).unwrap();

        assert_eq!(result.detected_source.iso, "en");
        assert!(!result.detected_source.was_corrected);
    }

    #[test]
    fn test_parse_empty_alternate_uses_nominal() {
        let body = r#"[[["Bonjour","Hello"]],null,"en",null,null,null,null,null,[[""]]]"#;
        let result = parse_response(body, false).unwrap();

        assert_eq!(result.detected_source.iso, "en");
        assert!(!result.detected_source.was_corrected);
    }

    #[test]
    fn test_parse_missing_detection_fields() {
        let result = parse_response(r#"[[["x"]]]"#, false).unwrap();
        assert_eq!(result.detected_source, DetectedSource::default());
    }

    // ==================== Suggestion Tests ====================

    #[test]
    fn test_parse_auto_corrected_suggestion() {
        let body = r#"[[["Hola mundo","Hola mundo"]],null,"es",null,null,null,null,["<b><i>Hola</i></b> mundo","Hola mundo",null,null,null,true]]"#;
        let result = parse_response(body, false).unwrap();

        assert_eq!(result.source_suggestion.value, "[Hola] mundo");
        assert!(result.source_suggestion.auto_corrected);
        assert!(!result.source_suggestion.was_questioned);
    }

    #[test]
    fn test_parse_questioned_suggestion() {
        let body = r#"[[["Hi","Helo"]],,"en",,,,,["<b><i>Hello</i></b>","Hello",[1],,,false]]"#;
        let result = parse_response(body, false).unwrap();

        assert_eq!(result.source_suggestion.value, "[Hello]");
        assert!(!result.source_suggestion.auto_corrected);
        assert!(result.source_suggestion.was_questioned);
    }

    #[test]
    fn test_parse_suggestion_without_flag_is_questioned() {
        let body = r#"[[["Hi"]],,"en",,,,,["a <b><i>b</i></b> <b><i>c</i></b>"]]"#;
        let result = parse_response(body, false).unwrap();

        assert_eq!(result.source_suggestion.value, "a [b] [c]");
        assert!(result.source_suggestion.was_questioned);
    }

    // ==================== Malformed Tests ====================

    #[test]
    fn test_parse_missing_top_level_array() {
        let err = parse_response("null", false).unwrap_err();
        assert!(err.to_string().contains("Invalid response format"));
    }

    #[test]
    fn test_parse_missing_first_element() {
        assert!(parse_response("[]", false).is_err());
        assert!(parse_response("[null,null,\"en\"]", false).is_err());
        assert!(parse_response("[,,\"en\"]", false).is_err());
    }

    #[test]
    fn test_parse_first_element_not_array() {
        assert!(parse_response(r#"["Hola"]"#, false).is_err());
    }

    #[test]
    fn test_parse_garbage_is_malformed() {
        let err = parse_response("<html>Too Many Requests</html>", false).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse translation response"));
        assert!(err.raw.is_none());
    }

    // ==================== Raw Tests ====================

    #[test]
    fn test_parse_raw_attached_on_success() {
        let body = r#"[[["Hola","Hello"]],,"en"]"#;
        let result = parse_response(body, true).unwrap();

        assert_eq!(result.raw_payload.as_deref(), Some(body));
    }

    #[test]
    fn test_parse_raw_attached_on_failure() {
        let err = parse_response("[null]", true).unwrap_err();
        assert_eq!(err.raw.as_deref(), Some("[null]"));

        let err = parse_response("{broken", true).unwrap_err();
        assert_eq!(err.raw.as_deref(), Some("{broken"));
    }

    // ==================== Serialization Tests ====================

    #[test]
    fn test_result_serializes_camel_case() {
        let result = TranslationResult {
            text: "Hola".to_string(),
            detected_source: DetectedSource {
                iso: "en".to_string(),
                was_corrected: false,
            },
            source_suggestion: SourceSuggestion::default(),
            raw_payload: None,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["text"], "Hola");
        assert_eq!(json["detectedSource"]["iso"], "en");
        assert_eq!(json["detectedSource"]["wasCorrected"], false);
        assert_eq!(json["sourceSuggestion"]["autoCorrected"], false);
        assert_eq!(json["sourceSuggestion"]["wasQuestioned"], false);
        assert!(json.get("rawPayload").is_none());
    }
}
