//! Salary normalization.
//!
//! Every stored vacancy carries a salary *object*. Source salaries are kept
//! verbatim when they have a lower bound; anything else (absent, `null`,
//! objects without `from`, unparsable strings) becomes the placeholder record
//! `{"value": "Данные не указаны"}`.

use serde_json::{Map, Value, json};

/// Key of the lower bound in source salary objects.
pub const LOWER_BOUND_KEY: &str = "from";

/// Text stored in the placeholder record ("data not specified").
pub const PLACEHOLDER_TEXT: &str = "Данные не указаны";

/// The canonical record substituted for missing or unusable salary data.
pub fn placeholder_salary() -> Value {
    json!({ "value": PLACEHOLDER_TEXT })
}

/// Normalize an arbitrary salary value into a structured salary record.
///
/// Strings are parsed as JSON first. Never fails: every malformed input
/// degrades to [`placeholder_salary`].
pub fn normalize_salary(raw: Option<&Value>) -> Value {
    match raw {
        Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
            Ok(parsed) => keep_if_bounded(&parsed),
            Err(_) => placeholder_salary(),
        },
        Some(value) => keep_if_bounded(value),
        None => placeholder_salary(),
    }
}

fn keep_if_bounded(value: &Value) -> Value {
    match value.as_object() {
        Some(object) if object.contains_key(LOWER_BOUND_KEY) => value.clone(),
        _ => placeholder_salary(),
    }
}

/// Returns true if `salary` is the placeholder record.
pub fn is_placeholder(salary: &Value) -> bool {
    *salary == placeholder_salary()
}

/// Numeric lower bound of a salary record, if it has one.
///
/// `{"from": null}` and placeholder records yield `None`, which keeps them
/// out of salary aggregation.
pub fn lower_bound(salary: &Value) -> Option<f64> {
    salary.get(LOWER_BOUND_KEY).and_then(Value::as_f64)
}

/// Human-readable one-line salary description for reports.
pub fn describe_salary(salary: &Value) -> String {
    if is_placeholder(salary) {
        return PLACEHOLDER_TEXT.to_string();
    }
    let Some(object) = salary.as_object() else {
        return PLACEHOLDER_TEXT.to_string();
    };
    if !object.contains_key(LOWER_BOUND_KEY) {
        return PLACEHOLDER_TEXT.to_string();
    }

    let mut parts = Vec::new();
    if let Some(from) = number_text(object, LOWER_BOUND_KEY) {
        parts.push(format!("from {from}"));
    }
    if let Some(to) = number_text(object, "to") {
        parts.push(format!("to {to}"));
    }
    if parts.is_empty() {
        return PLACEHOLDER_TEXT.to_string();
    }
    if let Some(currency) = object.get("currency").and_then(Value::as_str) {
        parts.push(currency.to_string());
    }
    match object.get("gross").and_then(Value::as_bool) {
        Some(true) => parts.push("(gross)".to_string()),
        Some(false) => parts.push("(net)".to_string()),
        None => {}
    }
    parts.join(" ")
}

fn number_text(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .filter(|v| v.is_number())
        .map(Value::to_string)
}
