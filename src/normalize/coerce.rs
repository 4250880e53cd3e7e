//! Total coercion functions for loosely typed source values
//!
//! Every function here accepts anything a source column can hold (including
//! an absent value) and returns the documented fallback instead of failing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static NON_SLUG_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

const TRUTHY: [&str; 4] = ["1", "true", "yes", "y"];

/// Interpret a loosely typed flag.
///
/// Booleans pass through, the strings `1`, `true`, `yes` and `y` (any case)
/// and the number 1 are true, and everything else is false. An absent value
/// is false too, so callers with a "default true" policy must check for
/// presence before calling this.
pub fn to_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => {
            let s = s.trim();
            TRUTHY.iter().any(|t| s.eq_ignore_ascii_case(t))
        }
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        _ => false,
    }
}

/// Parse a JSON-or-JSON-string value.
///
/// Objects and arrays are returned as they are, strings are parsed, and
/// anything unparseable yields `None`.
pub fn try_json(value: Option<&Value>) -> Option<Value> {
    match value {
        Some(v @ (Value::Object(_) | Value::Array(_))) => Some(v.clone()),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::debug!(error = %e, "Discarding malformed JSON column");
                None
            }
        },
        _ => None,
    }
}

/// Coerce to a sequence, falling back to an empty one
pub fn to_array(value: Option<&Value>) -> Vec<Value> {
    if let Some(Value::Array(arr)) = value {
        return arr.clone();
    }
    match try_json(value) {
        Some(Value::Array(arr)) => arr,
        _ => Vec::new(),
    }
}

/// Coerce to a (non-array) object, falling back to `None`
pub fn to_object(value: Option<&Value>) -> Option<Map<String, Value>> {
    if let Some(Value::Object(obj)) = value {
        return Some(obj.clone());
    }
    match try_json(value) {
        Some(Value::Object(obj)) => Some(obj),
        _ => None,
    }
}

/// Machine slug: lower-case, non-alphanumeric runs become one hyphen,
/// no leading or trailing hyphens.
pub fn to_kebab(s: &str) -> String {
    let lowered = s.trim().to_lowercase();
    NON_SLUG_RUN
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// A URL-or-attachments column reduced to a single URL.
///
/// Strings are trimmed (empty means no URL); attachment arrays yield the
/// `url` of their first element.
pub fn first_attachment_url(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Some(Value::Array(items)) => items
            .first()
            .and_then(|first| first.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// Render a scalar as text. Numbers and booleans keep their JSON spelling;
/// null, arrays and objects have no text form.
pub fn to_text(value: Option<&Value>, trim: bool) -> Option<String> {
    match value {
        Some(Value::String(s)) if trim => Some(s.trim().to_string()),
        Some(Value::String(s)) => Some(s.clone()),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Some(v.to_string()),
        _ => None,
    }
}
