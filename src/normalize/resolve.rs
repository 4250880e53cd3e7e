//! Candidate-key lookup over a raw record's columns
//!
//! Column names drift between deployments (`template_id`, `Template_id`,
//! `Template ID`), so a canonical field lists several candidate keys in
//! priority order. Resolution makes two passes:
//!
//! 1. exact: the first candidate literally present wins, even if its value
//!    is `null`
//! 2. fuzzy: keys are compared after [`normalize_key`], and again the first
//!    matching candidate wins

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]").unwrap());

/// Lower-case and strip every non-alphanumeric character
pub fn normalize_key(key: &str) -> String {
    NON_ALNUM.replace_all(&key.to_lowercase(), "").into_owned()
}

/// Find the value for the highest-priority candidate present in `raw`.
///
/// Returns `None` only when no candidate matches in either pass; callers
/// apply their own default.
pub fn resolve<'a>(raw: &'a Map<String, Value>, candidates: &[&str]) -> Option<&'a Value> {
    if let Some(value) = candidates.iter().find_map(|key| raw.get(*key)) {
        return Some(value);
    }

    // Normalized raw keys in column order, so the earliest column wins a tie
    let normalized: Vec<(String, &Value)> = raw
        .iter()
        .map(|(key, value)| (normalize_key(key), value))
        .collect();

    candidates.iter().find_map(|candidate| {
        let wanted = normalize_key(candidate);
        if wanted.is_empty() {
            return None;
        }
        normalized
            .iter()
            .find(|(key, _)| *key == wanted)
            .map(|(_, value)| *value)
    })
}
