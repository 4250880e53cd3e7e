//! Reading raw records from local JSON input
//!
//! Accepts a JSON array of rows, a single page object (`{"records": [...]}`),
//! a single row, or newline-delimited rows. A row is either a source row
//! (`{"id": ..., "fields": {...}}`) or a bare column map, which gets a
//! positional id.

use crate::normalize::RawRecord;
use anyhow::{Context, Result};
use serde_json::{Map, Value};

/// Parse raw records from a whole input buffer
pub fn parse_raw_records(content: &[u8]) -> Result<Vec<RawRecord>> {
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let text = std::str::from_utf8(content).context("Input is not valid UTF-8")?;
    if looks_like_ndjson(text) {
        return parse_ndjson(text);
    }

    // simd-json rewrites its buffer in place, so it gets a copy
    let mut scratch = text.as_bytes().to_vec();
    match simd_json::serde::from_slice::<Value>(&mut scratch) {
        Ok(value) => Ok(rows_from_document(value)),
        Err(e) => {
            tracing::debug!(error = %e, "SIMD parse failed, retrying with serde_json");
            let value: Value = serde_json::from_str(text).context("Failed to parse JSON input")?;
            Ok(rows_from_document(value))
        }
    }
}

/// More than one non-empty line, the first of which is a complete document
fn looks_like_ndjson(text: &str) -> bool {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    match (lines.next(), lines.next()) {
        (Some(first), Some(_)) => serde_json::from_str::<Value>(first).is_ok(),
        _ => false,
    }
}

fn parse_ndjson(text: &str) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .with_context(|| format!("Failed to parse JSON on line {}", line_no + 1))?;
        records.push(raw_from_value(value, records.len()));
    }
    Ok(records)
}

fn rows_from_document(value: Value) -> Vec<RawRecord> {
    match value {
        Value::Array(rows) => rows
            .into_iter()
            .enumerate()
            .map(|(idx, row)| raw_from_value(row, idx))
            .collect(),
        Value::Object(mut obj) if matches!(obj.get("records"), Some(Value::Array(_))) => {
            match obj.remove("records") {
                Some(Value::Array(rows)) => rows
                    .into_iter()
                    .enumerate()
                    .map(|(idx, row)| raw_from_value(row, idx))
                    .collect(),
                _ => Vec::new(),
            }
        }
        other => vec![raw_from_value(other, 0)],
    }
}

/// Interpret one JSON value as a raw record
pub fn raw_from_value(value: Value, index: usize) -> RawRecord {
    let positional = || format!("row{}", index + 1);
    match value {
        Value::Object(mut obj) if obj.get("fields").is_some_and(Value::is_object) => {
            let id = match obj.remove("id") {
                Some(Value::String(s)) => s,
                Some(Value::Number(n)) => n.to_string(),
                _ => positional(),
            };
            let fields = match obj.remove("fields") {
                Some(Value::Object(fields)) => fields,
                _ => Map::new(),
            };
            RawRecord::new(id, fields)
        }
        Value::Object(obj) => RawRecord::new(positional(), obj),
        _ => RawRecord::new(positional(), Map::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(records: &[RawRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_array_of_source_rows() {
        let input = br#"[{"id": "recA", "fields": {"name": "A"}}, {"id": "recB", "fields": {}}]"#;
        let records = parse_raw_records(input).unwrap();
        assert_eq!(ids(&records), ["recA", "recB"]);
        assert_eq!(records[0].fields["name"], "A");
    }

    #[test]
    fn test_page_object() {
        let input = br#"{"records": [{"id": "recA", "fields": {"TYPE": "Poster"}}], "offset": "x"}"#;
        let records = parse_raw_records(input).unwrap();
        assert_eq!(ids(&records), ["recA"]);
    }

    #[test]
    fn test_ndjson_and_bare_rows() {
        let input = b"{\"id\": \"recA\", \"fields\": {\"name\": \"A\"}}\n\n{\"name\": \"bare\"}\n";
        let records = parse_raw_records(input).unwrap();
        assert_eq!(ids(&records), ["recA", "row2"]);
        assert_eq!(records[1].fields["name"], "bare");
    }

    #[test]
    fn test_bad_ndjson_line() {
        let input = b"{\"id\": \"recA\", \"fields\": {}}\n{oops\n";
        let err = parse_raw_records(input).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let input = b"{\"name\": \"\xff\xfe\"}\n{\"name\": \"b\"}\n";
        let err = parse_raw_records(input).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));

        let err = parse_raw_records(b"[{\"name\": \"\xff\"}]").unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_blank_input() {
        assert!(parse_raw_records(b" \n\n").unwrap().is_empty());
    }

    #[test]
    fn test_single_bare_object() {
        let records = parse_raw_records(br#"{"Template ID": "tpl-9"}"#).unwrap();
        assert_eq!(ids(&records), ["row1"]);
    }
}
