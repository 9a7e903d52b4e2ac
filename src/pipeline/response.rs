//! Interpret a raw extraction reply as an [`ExtractionResult`].
//!
//! Models are asked for JSON but do not always send bare JSON: some wrap it
//! in a ```` ```json ```` fence, others add a sentence before or after.
//! [`clean_json_reply`] strips both before parsing. A reply that still does
//! not parse is reported as a [`ChunkError`] and the chunk is dropped by the
//! orchestrator.
//!
//! ## Value coercion
//!
//! | JSON value            | Field value                   |
//! |-----------------------|-------------------------------|
//! | string                | as-is                         |
//! | number / bool         | its JSON text                 |
//! | array of scalars      | items joined with `", "`      |
//! | null / object / absent| absent                        |
//!
//! ## Confidence
//!
//! The prompt asks for a `confidence_score`; replies in the wild use
//! `confidence_scores`, `confidence_score` or `confidence`. The first key
//! present wins. An object maps field keys to numbers (numeric strings are
//! accepted); a bare number applies to every field.

use crate::error::ChunkError;
use crate::model::{ExtractionResult, Field};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Keys checked, in order, for the confidence map.
const CONFIDENCE_KEYS: [&str; 3] = ["confidence_scores", "confidence_score", "confidence"];

static RE_FENCED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*\n?(.*?)\n?\s*```").unwrap());

/// Strip Markdown fences and surrounding prose, leaving the JSON object text.
pub fn clean_json_reply(raw: &str) -> String {
    let text = raw.trim().trim_start_matches('\u{feff}');
    let inner = match RE_FENCED.captures(text) {
        Some(caps) => caps.get(1).map_or(text, |m| m.as_str()),
        None => text,
    };
    match (inner.find('{'), inner.rfind('}')) {
        (Some(start), Some(end)) if start < end => inner[start..=end].to_string(),
        _ => inner.trim().to_string(),
    }
}

/// Parse one extraction reply. `chunk` is the 1-indexed chunk number used in
/// error messages.
pub fn parse_extraction_reply(raw: &str, chunk: usize) -> Result<ExtractionResult, ChunkError> {
    let cleaned = clean_json_reply(raw);
    let value: Value = serde_json::from_str(&cleaned).map_err(|e| ChunkError::InvalidJson {
        chunk,
        detail: e.to_string(),
    })?;
    match value {
        Value::Object(obj) => Ok(extraction_from_object(&obj)),
        other => Err(ChunkError::NotAnObject {
            chunk,
            kind: json_kind(&other).to_string(),
        }),
    }
}

fn extraction_from_object(obj: &Map<String, Value>) -> ExtractionResult {
    let values = Field::ALL
        .into_iter()
        .filter_map(|f| obj.get(f.key()).and_then(coerce_value).map(|v| (f, v)))
        .collect();
    let confidence_scores = CONFIDENCE_KEYS
        .iter()
        .find_map(|k| obj.get(*k))
        .map(coerce_confidence)
        .unwrap_or_default();
    ExtractionResult {
        values,
        confidence_scores,
    }
}

fn coerce_value(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::Array(_) | Value::Object(_) | Value::Null => None,
                    scalar => coerce_value(scalar),
                })
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Null | Value::Object(_) => None,
    }
}

fn as_confidence(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_confidence(v: &Value) -> BTreeMap<Field, f64> {
    match v {
        Value::Object(map) => map
            .iter()
            .filter_map(|(k, v)| Some((Field::from_key(k)?, as_confidence(v)?)))
            .collect(),
        scalar => match as_confidence(scalar) {
            Some(c) => Field::ALL.into_iter().map(|f| (f, c)).collect(),
            None => BTreeMap::new(),
        },
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"{
        "company_name": "Acme Robotics",
        "technology_type": "Device",
        "market_size": 4200000000,
        "missing_skills": ["regulatory", "sales"],
        "current_sales": null,
        "confidence_scores": {"company_name": 0.95, "technology_type": "0.8", "bogus": 1.0}
    }"#;

    #[test]
    fn parses_plain_json() {
        let r = parse_extraction_reply(REPLY, 1).unwrap();
        assert_eq!(r.value(Field::CompanyName), Some("Acme Robotics"));
        assert_eq!(r.value(Field::MarketSize), Some("4200000000"));
        assert_eq!(r.value(Field::MissingSkills), Some("regulatory, sales"));
        assert_eq!(r.value(Field::CurrentSales), None);
        assert_eq!(r.value(Field::YearsToExit), None);
        assert_eq!(r.confidence(Field::CompanyName), 0.95);
        assert_eq!(r.confidence(Field::TechnologyType), 0.8);
        assert_eq!(r.confidence(Field::MarketSize), 0.0);
        assert_eq!(r.confidence_scores.len(), 2);
    }

    #[test]
    fn strips_json_fence() {
        let raw = format!("```json\n{REPLY}\n```");
        let r = parse_extraction_reply(&raw, 1).unwrap();
        assert_eq!(r.value(Field::CompanyName), Some("Acme Robotics"));
    }

    #[test]
    fn strips_surrounding_prose() {
        let raw = "Here is the extraction:\n{\"company_name\": \"Acme\"}\nLet me know!";
        assert_eq!(clean_json_reply(raw), "{\"company_name\": \"Acme\"}");
    }

    #[test]
    fn singular_confidence_key_is_read() {
        let raw = r#"{"company_name": "Acme", "confidence_score": {"company_name": 0.7}}"#;
        let r = parse_extraction_reply(raw, 1).unwrap();
        assert_eq!(r.confidence(Field::CompanyName), 0.7);
    }

    #[test]
    fn scalar_confidence_applies_to_all_fields() {
        let raw = r#"{"company_name": "Acme", "confidence": 0.6}"#;
        let r = parse_extraction_reply(raw, 1).unwrap();
        assert!(Field::ALL.iter().all(|f| r.confidence(*f) == 0.6));
    }

    #[test]
    fn missing_confidence_map_defaults_to_zero() {
        let r = parse_extraction_reply(r#"{"company_name": "Acme"}"#, 1).unwrap();
        assert!(r.confidence_scores.is_empty());
        assert_eq!(r.confidence(Field::CompanyName), 0.0);
    }

    #[test]
    fn invalid_json_is_chunk_error() {
        let err = parse_extraction_reply("I could not find any information.", 3).unwrap_err();
        assert!(matches!(err, ChunkError::InvalidJson { chunk: 3, .. }));
    }

    #[test]
    fn non_object_is_chunk_error() {
        let err = parse_extraction_reply("[1, 2, 3]", 2).unwrap_err();
        assert_eq!(
            err,
            ChunkError::NotAnObject {
                chunk: 2,
                kind: "array".into()
            }
        );
    }
}
