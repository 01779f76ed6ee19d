//! Parse model output into topic and classification records
//!
//! The model is expected to answer with one JSON object. Responses wrapped
//! in markdown fences or surrounded by prose are tolerated; entries that do
//! not match the expected shape are dropped with a warning and the rest are
//! kept.

use mailsift_domain::{Classification, LlmTopic};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::EngineError;

/// Top-level key of a topic extraction response
pub const TOPICS_KEY: &str = "topics";

/// Top-level key of a classification response
pub const CLASSIFICATIONS_KEY: &str = "classifications";

/// Parse a topic extraction response
pub fn parse_topics(response: &str) -> Result<Vec<LlmTopic>, EngineError> {
    let entries = match response_array(response, TOPICS_KEY)? {
        Some(entries) => entries,
        None => return Ok(Vec::new()),
    };

    let mut topics = Vec::new();
    for (idx, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<LlmTopic>(entry) {
            Ok(topic) if !topic.name.trim().is_empty() => topics.push(topic),
            Ok(_) => warn!("Topic {} has an empty name, skipping", idx),
            Err(e) => warn!("Failed to parse topic {}: {}", idx, e),
        }
    }
    Ok(topics)
}

/// Parse a classification response for a chunk of `chunk_len` messages
///
/// Indices stay relative to the chunk; entries pointing past it are
/// dropped.
pub fn parse_classifications(
    response: &str,
    chunk_len: usize,
) -> Result<Vec<Classification>, EngineError> {
    let entries = match response_array(response, CLASSIFICATIONS_KEY)? {
        Some(entries) => entries,
        None => return Ok(Vec::new()),
    };

    let mut classifications = Vec::new();
    for (idx, entry) in entries.iter().enumerate() {
        match parse_classification(entry, chunk_len) {
            Ok(c) => classifications.push(c),
            Err(e) => warn!("Classification {} rejected: {}", idx, e),
        }
    }
    Ok(classifications)
}

/// Find the JSON object in a response, handling markdown code blocks
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        // skip the info string (```json) on the opening line
        let body = rest.split_once('\n').map_or("", |(_, body)| body);
        let body = body.find("```").map_or(body, |end| &body[..end]);
        return body.trim();
    }

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }

    // prose around the object
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// Decode the first JSON object found in a response
///
/// The fenced or outermost candidate is tried first. When that fails, each
/// `{` in the response is tried in turn as the start of an object, so braces
/// in surrounding prose and text after the object are skipped.
pub fn decode_json(response: &str) -> Result<Value, EngineError> {
    let first_error = match serde_json::from_str::<Value>(extract_json(response)) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    for (start, _) in response.match_indices('{') {
        let mut stream =
            serde_json::Deserializer::from_str(&response[start..]).into_iter::<Value>();
        if let Some(Ok(value @ Value::Object(_))) = stream.next() {
            return Ok(value);
        }
    }

    Err(first_error.into())
}

/// Decode the response object and take the array under `key`
///
/// A missing key is not an error: the model simply reported nothing.
fn response_array(response: &str, key: &str) -> Result<Option<Vec<Value>>, EngineError> {
    let value = decode_json(response)?;

    let mut object: Map<String, Value> = match value {
        Value::Object(object) => object,
        other => {
            return Err(EngineError::ResponseParse(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            )))
        }
    };

    match object.remove(key) {
        None | Some(Value::Null) => {
            warn!("Response has no '{}' key", key);
            Ok(None)
        }
        Some(Value::Array(entries)) => Ok(Some(entries)),
        Some(other) => Err(EngineError::ResponseParse(format!(
            "'{}' should be an array, found {}",
            key,
            json_kind(&other)
        ))),
    }
}

fn parse_classification(json: &Value, chunk_len: usize) -> Result<Classification, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Classification is not a JSON object".to_string())?;

    let email_index = obj
        .get("email_index")
        .and_then(Value::as_u64)
        .ok_or_else(|| "Missing or invalid 'email_index'".to_string())?;
    let email_index = usize::try_from(email_index)
        .map_err(|_| format!("'email_index' {} is too large", email_index))?;
    if email_index >= chunk_len {
        return Err(format!(
            "'email_index' {} is outside the {} submitted messages",
            email_index, chunk_len
        ));
    }

    let topic = obj
        .get("topic")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| "Missing or invalid 'topic'".to_string())?;

    let confidence = obj
        .get("confidence")
        .and_then(Value::as_f64)
        .ok_or_else(|| "Missing or invalid 'confidence'".to_string())?;
    if !(0.0..=1.0).contains(&confidence) {
        return Err(format!("'confidence' {} is outside [0, 1]", confidence));
    }

    Ok(Classification::new(email_index, topic, confidence))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_classification() {
        let response = r#"{"classifications":[{"email_index":0,"topic":"Work","confidence":0.9}]}"#;
        let parsed = parse_classifications(response, 1).unwrap();
        assert_eq!(parsed, vec![Classification::new(0, "Work", 0.9)]);
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let response = "```json\n{\"classifications\": [\n  {\"email_index\": 1, \"topic\": \"Billing\", \"confidence\": 0.75}\n]}\n```";
        let parsed = parse_classifications(response, 2).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].email_index, 1);
        assert_eq!(parsed[0].topic, "Billing");
    }

    #[test]
    fn test_extract_json_variants() {
        assert_eq!(extract_json("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(extract_json("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(
            extract_json("Here you go:\n{\"a\":1}\nHope that helps."),
            "{\"a\":1}"
        );
        assert_eq!(extract_json("no json here"), "no json here");
        assert_eq!(
            extract_json("```json\n{\"a\":1}\n```\nAnything else?"),
            "{\"a\":1}"
        );
    }

    #[test]
    fn test_parse_fenced_json_with_trailing_prose() {
        let response = "```json\n{\"classifications\":[{\"email_index\":0,\"topic\":\"Work\",\"confidence\":0.9}]}\n```\nLet me know if you need anything else.";
        let parsed = parse_classifications(response, 1).unwrap();
        assert_eq!(parsed, vec![Classification::new(0, "Work", 0.9)]);
    }

    #[test]
    fn test_parse_json_after_brace_in_prose() {
        let response = "Sure {see below}:\n{\"classifications\":[{\"email_index\":0,\"topic\":\"Work\",\"confidence\":0.9}]}\nThanks {again}.";
        let parsed = parse_classifications(response, 1).unwrap();
        assert_eq!(parsed, vec![Classification::new(0, "Work", 0.9)]);
    }

    #[test]
    fn test_decode_json_reports_first_error() {
        let err = decode_json("no {valid} json {here").unwrap_err();
        assert!(matches!(err, EngineError::ResponseParse(_)));
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_classifications("This is not JSON", 3);
        assert!(matches!(result, Err(EngineError::ResponseParse(_))));
    }

    #[test]
    fn test_parse_json_not_object() {
        let result = parse_topics(r#"[{"name": "Work"}]"#);
        assert!(matches!(result, Err(EngineError::ResponseParse(_))));
    }

    #[test]
    fn test_missing_key_is_empty() {
        assert!(parse_topics(r#"{"result": []}"#).unwrap().is_empty());
        assert!(parse_classifications(r#"{}"#, 5).unwrap().is_empty());
    }

    #[test]
    fn test_key_not_array() {
        let result = parse_topics(r#"{"topics": "Work, Billing"}"#);
        assert!(matches!(result, Err(EngineError::ResponseParse(_))));
    }

    #[test]
    fn test_invalid_entries_dropped() {
        let response = r#"{"classifications": [
            {"email_index": 0, "topic": "Work", "confidence": 0.9},
            {"email_index": 1, "topic": "Work"},
            {"email_index": 2, "topic": "Work", "confidence": 1.5},
            {"email_index": 7, "topic": "Work", "confidence": 0.5},
            {"email_index": -1, "topic": "Work", "confidence": 0.5},
            {"email_index": 3, "topic": "", "confidence": 0.5},
            "not an object",
            {"email_index": 4, "topic": "Social", "confidence": 0}
        ]}"#;
        let parsed = parse_classifications(response, 5).unwrap();
        assert_eq!(
            parsed,
            vec![
                Classification::new(0, "Work", 0.9),
                Classification::new(4, "Social", 0.0),
            ]
        );
    }

    #[test]
    fn test_parse_topics_keeps_extra_fields() {
        let response = r#"{"topics": [
            {"name": "Billing", "description": "Invoices and payments", "keywords": ["invoice"]},
            {"name": "Travel"},
            {"description": "nameless"}
        ]}"#;
        let topics = parse_topics(response).unwrap();
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].name, "Billing");
        assert!(topics[0].extra.contains_key("keywords"));
        assert_eq!(topics[1].description, "");
    }
}
