//! mozlint: JSON artifact keyed by relative path -> array of findings.
//!
//! Some legacy mozlint outputs mix `line`/`lineno` and `char`/`column` keys
//! (spec 9's open question). Both are accepted and normalized here.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::path_norm::normalize;
use crate::types::{Level, ParseResult, RawIssue};

pub fn parse(task_name: &str, artifact: &[u8]) -> ParseResult {
    let mut out = ParseResult::default();

    let parsed: BTreeMap<String, Vec<Value>> = match serde_json::from_slice(artifact) {
        Ok(v) => v,
        Err(e) => {
            out.push_diagnostic(format!("mozlint: malformed artifact: {e}"));
            return out;
        }
    };

    for (file_key, entries) in parsed {
        for entry in entries {
            let Some(obj) = entry.as_object() else {
                out.push_diagnostic(format!("mozlint: non-object entry for {file_key}"));
                continue;
            };

            let raw_path = obj
                .get("path")
                .and_then(Value::as_str)
                .unwrap_or(&file_key);
            let (path, was_absolute) = normalize(raw_path);
            if was_absolute {
                out.push_diagnostic(format!("mozlint: absolute path coerced: {raw_path}"));
            }

            let line = obj
                .get("line")
                .or_else(|| obj.get("lineno"))
                .and_then(Value::as_u64)
                .map(|v| v as u32);

            let column = obj
                .get("column")
                .or_else(|| obj.get("char"))
                .and_then(Value::as_u64)
                .map(|v| v as u32);

            let Some(rule) = obj.get("rule").and_then(Value::as_str) else {
                out.push_diagnostic(format!("mozlint: missing rule in {path}"));
                continue;
            };

            let Some(message) = obj.get("message").and_then(Value::as_str) else {
                out.push_diagnostic(format!("mozlint: missing message in {path}"));
                continue;
            };

            let level = match obj.get("level").and_then(Value::as_str) {
                Some("error") => Level::Error,
                Some("warning") => Level::Warning,
                Some(other) => {
                    out.push_diagnostic(format!("mozlint: unknown level '{other}' in {path}"));
                    Level::Warning
                }
                None => {
                    out.push_diagnostic(format!("mozlint: missing level in {path}"));
                    Level::Warning
                }
            };

            if let Some(l) = line {
                if l < 1 {
                    out.push_diagnostic(format!("mozlint: invalid line {l} in {path}"));
                    continue;
                }
            }

            let source = obj.get("source").and_then(Value::as_str).map(String::from);

            out.issues.push(RawIssue {
                path,
                line,
                nb_lines: 1,
                column,
                check: Some(rule.to_string()),
                analyzer: task_name.to_string(),
                level,
                message: message.to_string(),
                body: source,
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Level;

    #[test]
    fn parses_well_formed_eslint_entry() {
        let artifact = br#"{"src/a.js":[{"path":"src/a.js","line":10,"column":1,"rule":"no-var","level":"error","message":"Unexpected var."}]}"#;
        let result = parse("source-test-mozlint-eslint", artifact);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].level, Level::Error);
        assert_eq!(result.issues[0].line, Some(10));
    }

    #[test]
    fn accepts_legacy_lineno_and_char_keys() {
        let artifact = br#"{"src/a.js":[{"rule":"no-var","level":"warning","message":"m","lineno":5,"char":2}]}"#;
        let result = parse("source-test-mozlint-eslint", artifact);
        assert_eq!(result.issues[0].line, Some(5));
        assert_eq!(result.issues[0].column, Some(2));
    }

    #[test]
    fn missing_rule_is_diagnostic_not_panic() {
        let artifact = br#"{"src/a.js":[{"level":"error","message":"m","line":1}]}"#;
        let result = parse("t", artifact);
        assert!(result.issues.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
    }
}
