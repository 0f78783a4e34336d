use crate::error::{CodefluxError, ErrorCode, Result};
use crate::knowledge::PatternKnowledgeRecord;
use crate::logger::Logger;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

// Untagged or json-tagged fence; the object runs to the last `}` before a
// closing fence, so fences quoted inside string values stay in the body.
static JSON_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```").unwrap());

const USE_CASES_KEYS: [&str; 2] = ["useCases", "use_cases"];
const CONSIDERATIONS_KEYS: [&str; 2] = ["considerations", "key_considerations"];

type ShapeAttempt = fn(&Value) -> Option<Vec<PatternKnowledgeRecord>>;

/// Recognized reply shapes, highest priority first.
const SHAPES: [(&str, ShapeAttempt); 5] = [
    ("top_level_array", top_level_array),
    ("pattern_knowledge_field", pattern_knowledge_field),
    ("patterns_field", patterns_field),
    ("single_record", single_record),
    ("keyed_records", keyed_records),
];

/// Pulls pattern knowledge records out of a JSON-bearing model reply.
///
/// Malformed or unrecognized replies fall back to one generic record per
/// entry of `fallback_names`; with no fallback names they fail with a parse
/// error whose context is the raw reply.
///
/// The only side effect is the records written to `logger`. Callers that
/// must not print pass a logger built with [`Logger::with_buffer`].
pub fn extract_pattern_knowledge<S: AsRef<str>>(
    raw: &str,
    fallback_names: &[S],
    logger: &Logger,
) -> Result<Vec<PatternKnowledgeRecord>> {
    let outcome = parse_candidate(json_candidate(raw), raw).and_then(|value| {
        classify(&value, logger).ok_or_else(|| CodefluxError::Parse {
            code: ErrorCode::ShapeUnrecognized,
            message: "could not find pattern knowledge in response".to_string(),
            context: raw.to_string(),
        })
    });

    match outcome {
        Ok(records) => Ok(records),
        Err(err) if !fallback_names.is_empty() => {
            logger.warn(
                "extract",
                "knowledge_fallback",
                &format!("{err}; using generic knowledge for {} pattern(s)", fallback_names.len()),
            );
            Ok(fallback_records(fallback_names))
        }
        Err(err) => {
            logger.error("extract", "knowledge_failed", &err.to_string());
            Err(err)
        }
    }
}

/// Generic placeholder knowledge, one record per name, in input order.
#[must_use]
pub fn fallback_records<S: AsRef<str>>(names: &[S]) -> Vec<PatternKnowledgeRecord> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            PatternKnowledgeRecord {
                pattern: name.to_string(),
                description: format!("The {name} pattern is a common parallel programming pattern."),
                use_cases: vec!["General parallel programming".to_string()],
                performance: "Performance depends on specific implementation details.".to_string(),
                considerations: vec![
                    "Consider hardware capabilities".to_string(),
                    "Consider data dependencies".to_string(),
                ],
            }
        })
        .collect()
}

/// The JSON object inside a json or untagged fence, else the whole reply.
fn json_candidate(raw: &str) -> &str {
    JSON_FENCE_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or(raw, |m| m.as_str())
}

fn parse_candidate(candidate: &str, raw: &str) -> Result<Value> {
    serde_json::from_str(candidate).map_err(|e| CodefluxError::Parse {
        code: ErrorCode::JsonMalformed,
        message: format!("response is not valid JSON: {e}"),
        context: raw.to_string(),
    })
}

fn classify(value: &Value, logger: &Logger) -> Option<Vec<PatternKnowledgeRecord>> {
    SHAPES.iter().find_map(|(name, attempt)| {
        let records = attempt(value).filter(|r| !r.is_empty())?;
        logger.info(
            "extract",
            "shape_matched",
            &format!("{name} ({} record(s))", records.len()),
        );
        Some(records)
    })
}

fn top_level_array(value: &Value) -> Option<Vec<PatternKnowledgeRecord>> {
    value.as_array().map(|items| records_from_list(items))
}

fn pattern_knowledge_field(value: &Value) -> Option<Vec<PatternKnowledgeRecord>> {
    list_field(value, "patternKnowledge").map(records_from_list)
}

fn patterns_field(value: &Value) -> Option<Vec<PatternKnowledgeRecord>> {
    list_field(value, "patterns").map(records_from_list)
}

fn single_record(value: &Value) -> Option<Vec<PatternKnowledgeRecord>> {
    let obj = value.as_object()?;
    if !truthy(obj.get("pattern")) || !has_record_fields(obj) {
        return None;
    }
    Some(vec![normalize(obj, text_field(obj, "pattern"))])
}

fn keyed_records(value: &Value) -> Option<Vec<PatternKnowledgeRecord>> {
    let obj = value.as_object()?;
    let records: Vec<_> = obj
        .iter()
        .filter_map(|(key, entry)| {
            let entry = entry.as_object()?;
            has_record_fields(entry).then(|| normalize(entry, key.clone()))
        })
        .collect();
    (!records.is_empty()).then_some(records)
}

fn list_field<'a>(value: &'a Value, key: &str) -> Option<&'a [Value]> {
    value.get(key)?.as_array().map(Vec::as_slice)
}

fn records_from_list(items: &[Value]) -> Vec<PatternKnowledgeRecord> {
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| normalize(obj, text_field(obj, "pattern")))
        .collect()
}

fn has_record_fields(obj: &Map<String, Value>) -> bool {
    truthy(obj.get("description"))
        && USE_CASES_KEYS.iter().any(|k| truthy(obj.get(*k)))
        && truthy(obj.get("performance"))
        && CONSIDERATIONS_KEYS.iter().any(|k| truthy(obj.get(*k)))
}

fn normalize(obj: &Map<String, Value>, pattern: String) -> PatternKnowledgeRecord {
    PatternKnowledgeRecord {
        pattern,
        description: text_field(obj, "description"),
        use_cases: string_list(obj, &USE_CASES_KEYS),
        performance: text_field(obj, "performance"),
        considerations: string_list(obj, &CONSIDERATIONS_KEYS),
    }
}

/// Presence test for model output: null, false, 0 and "" count as absent.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn text_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key).and_then(scalar_text).unwrap_or_default()
}

/// First present spelling wins; a bare string becomes a one-item list.
fn string_list(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    match keys.iter().map(|k| obj.get(*k)).find(|v| truthy(*v)).flatten() {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(other) => scalar_text(other).into_iter().collect(),
        None => Vec::new(),
    }
}
